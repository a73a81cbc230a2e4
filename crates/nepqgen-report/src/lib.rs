//! nepqgen-report: renders paper reports for people.
//!
//! The JSON form lives in `nepqgen_core::report`; this crate adds a
//! self-contained HTML page and a Markdown summary.

pub mod html;
pub mod markdown;
