// src/store.rs
//! The single current snapshot on disk: read back as carry-forward input,
//! replaced atomically on publish.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::config::consts::DEFAULT_FILE;
use crate::error::PipelineError;
use crate::model::Snapshot;

/// Previous snapshot at `path`, if there is a usable one. Every failure mode
/// is logged and treated as "no history".
pub fn load_previous(path: &Path) -> Option<Snapshot> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No previous snapshot");
            return None;
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Previous snapshot unreadable; ignoring");
            return None;
        }
    };

    let snap: Snapshot = match serde_json::from_str(&text) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Previous snapshot malformed; ignoring");
            return None;
        }
    };

    if !snap.is_current_schema() {
        tracing::warn!(
            path = %path.display(),
            found = snap.schema_version,
            "Previous snapshot has a different schema version; ignoring"
        );
        return None;
    }
    Some(snap)
}

/// Write `snapshot` to `path`: pretty JSON into a sibling temp file, synced,
/// then renamed over the target. Readers see the old document or the new one,
/// never a torn write.
pub fn publish(snapshot: &Snapshot, path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }

    let mut json = serde_json::to_string_pretty(snapshot)?;
    json.push('\n');

    let tmp = temp_sibling(path);
    let written = File::create(&tmp).and_then(|mut f| {
        f.write_all(json.as_bytes())?;
        f.sync_all()
    });
    if let Err(e) = written.and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    tracing::info!(path = %path.display(), bytes = json.len(), "Snapshot published");
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| s!(DEFAULT_FILE));
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

/// `--out` may name a file or a directory (existing, or hinted by a trailing
/// separator); directories get the default file name.
pub fn resolve_out_path(user_out: &str) -> PathBuf {
    if user_out.is_empty() {
        return PathBuf::from(DEFAULT_FILE);
    }
    let p = PathBuf::from(user_out);
    if looks_like_dir_hint(&p) || p.is_dir() { p.join(DEFAULT_FILE) } else { p }
}

pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(io::Error::other(format!(
            "Path exists but is not a directory: {}",
            dir.display()
        )));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

fn looks_like_dir_hint(p: &Path) -> bool {
    let s = p.to_string_lossy();
    s.ends_with('/') || s.ends_with('\\')
}
