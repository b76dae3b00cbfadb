// src/specs/mod.rs
//! # Upstream “specs” module
//!
//! This module hosts the **upstream-specific extraction specifications**. Each
//! spec knows one upstream representation and encodes *where the ground truth
//! lives* and *how to get it out robustly*.
//!
//! ## What lives here
//! - **Pure parsing** of bodies already fetched (HTML page, JSON feed).
//! - **Tolerant extraction** using `core::html` helpers (id lookup with nested
//!   tag balancing, tag stripping, whitespace/entity normalization).
//! - **Light shaping** into `model::RawPayload`: raw `(label, value)` pairs plus
//!   the adjustment notice.
//!
//! ## What does **not** live here
//! - **Transport** (`core::net`) and **retry** (`scrape`).
//! - **Grade recognition, numeric coercion, range checks** – the normalizer owns
//!   the alias table, so a new upstream is a data change there, not a code
//!   change here.
//! - **Carry-forward** from the previous snapshot.
//!
//! ## Typical call chain
//! ```text
//! scrape::fetch_all → source::<Kind>::fetch(province)
//!                       ↘ core::net::http_get → specs::<upstream>::parse
//!                                              ↘ RawPayload
//! ```
//!
//! ## Conventions
//! - Missing structure is `FetchFailure::Parse`, an absent page is
//!   `FetchFailure::NotFound`; neither is retried.
//! - Specs must be testable **offline** against saved fixtures
//!   (`tests/fixtures/*.shtml`).
pub mod feed;
pub mod price_page;
