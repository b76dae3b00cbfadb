// src/core/html.rs
//! Tolerant HTML scanning, no DOM. Tag and attribute names match
//! case-insensitively; text is left as the page wrote it.
//!
//! Lowercasing only touches ASCII, so byte offsets found in the lowercased copy
//! are valid in the original string.

use super::sanitize::{normalize_entities, normalize_ws};

pub fn to_lower(s: &str) -> String {
    s.chars().map(|c| c.to_ascii_lowercase()).collect()
}

/// Inner HTML of the element carrying `id="<id>"`, whatever its tag.
/// Nested elements of the same tag are balanced, so `<div id=a><div>..</div></div>`
/// yields the whole inner block.
pub fn element_by_id<'a>(s: &'a str, id: &str) -> Option<&'a str> {
    let lc = to_lower(s);
    let attr_at = find_id_attr(&lc, &to_lower(id))?;

    let open_start = lc[..attr_at].rfind('<')?;
    let tag: String = lc[open_start + 1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if tag.is_empty() {
        return None;
    }

    let open_end = lc[attr_at..].find('>')? + attr_at + 1;
    let close_start = matching_close(&lc, &tag, open_end)?;
    Some(&s[open_end..close_start])
}

/// Inner HTML of each top-level `<tag>…</tag>` in `s`, in order.
pub fn child_blocks<'a>(s: &'a str, tag: &str) -> Vec<&'a str> {
    let lc = to_lower(s);
    let tag = to_lower(tag);
    let open = format!("<{tag}");

    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(start) = next_open_tag(&lc, &open, pos) {
        let Some(open_end) = lc[start..].find('>').map(|i| start + i + 1) else { break };
        let Some(close_start) = matching_close(&lc, &tag, open_end) else { break };
        out.push(&s[open_end..close_start]);
        pos = close_start + tag.len() + 3; // "</" + tag + ">"
        if pos > s.len() { break; }
    }
    out
}

pub fn first_block<'a>(s: &'a str, tag: &str) -> Option<&'a str> {
    child_blocks(s, tag).into_iter().next()
}

/// Remove all tags `<...>`, decode the common entities, collapse whitespace.
pub fn text<S: AsRef<str>>(s: S) -> String {
    let s = normalize_entities(s.as_ref());

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&out)
}

/* ---------- helpers ---------- */

fn find_id_attr(lc: &str, id: &str) -> Option<usize> {
    for quoted in [format!("id=\"{id}\""), format!("id='{id}'")] {
        if let Some(at) = lc.find(&quoted) {
            return Some(at);
        }
    }

    // Unquoted: id=youjia> or id=youjia class=...
    let bare = format!("id={id}");
    let mut from = 0usize;
    while let Some(rel) = lc[from..].find(&bare) {
        let at = from + rel;
        let end = at + bare.len();
        match lc[end..].chars().next() {
            Some(c) if c == '>' || c == '/' || c.is_ascii_whitespace() => return Some(at),
            _ => from = end,
        }
    }
    None
}

/// Position of the next `<tag` that really opens `tag` (not `<tagfoo`).
fn next_open_tag(lc: &str, open: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    loop {
        let at = lc.get(pos..)?.find(open)? + pos;
        let after = at + open.len();
        match lc[after..].chars().next() {
            Some(c) if c == '>' || c == '/' || c.is_ascii_whitespace() => return Some(at),
            None => return None,
            _ => pos = after,
        }
    }
}

/// Start of the `</tag` closing the element whose content begins at `from`.
fn matching_close(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let open = format!("<{tag}");
    let close = format!("</{tag}");
    let mut depth = 1usize;
    let mut pos = from;

    loop {
        let next_close = lc.get(pos..)?.find(&close)? + pos;
        match next_open_tag(lc, &open, pos) {
            Some(o) if o < next_close => {
                depth += 1;
                pos = o + open.len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(next_close);
                }
                pos = next_close + close.len();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_by_id_balances_nested_tags() {
        let html = r#"<DIV ID="outer"><div>a</div><div>b</div></DIV><div id="other">x</div>"#;
        assert_eq!(element_by_id(html, "outer"), Some("<div>a</div><div>b</div>"));
        assert_eq!(element_by_id(html, "other"), Some("x"));
    }

    #[test]
    fn element_by_id_does_not_match_prefix() {
        let html = r#"<div id="youjiaCont">notice</div><div id="youjia"><dl></dl></div>"#;
        assert_eq!(element_by_id(html, "youjia"), Some("<dl></dl>"));
        assert_eq!(element_by_id(html, "youjiacont"), Some("notice"));
    }

    #[test]
    fn element_by_id_unquoted() {
        let html = "<ul id=list class=x><li>1</li></ul>";
        assert_eq!(element_by_id(html, "list"), Some("<li>1</li>"));
        assert_eq!(element_by_id(html, "lis"), None);
    }

    #[test]
    fn child_blocks_in_order() {
        let html = "<dl><dt>A</dt><dd>1</dd></dl>\n<DL class=x><dt>B</dt><dd>2</dd></DL><dlx>no</dlx>";
        let blocks = child_blocks(html, "dl");
        assert_eq!(blocks.len(), 2);
        assert_eq!(first_block(blocks[1], "dt"), Some("B"));
        assert_eq!(first_block(blocks[1], "dd"), Some("2"));
    }

    #[test]
    fn text_strips_and_collapses() {
        assert_eq!(text("<b>北京</b>&nbsp;92#\n <i>汽油</i>"), "北京 92# 汽油");
    }
}
