//! Registration-statement emission.
//!
//! The sole output format of the whole pipeline: one JS call expression
//! handing the combined stylesheet to a runtime registration function
//! under a logical module key:
//!
//! ```text
//! jcssReg('pages/home', '@charset "utf-8";.x{color:red}');
//! ```
//!
//! The key is the entry point's *original* relative path (as written in
//! the target's `src`, not the cwd-joined one) with a trailing `.css`
//! stripped case-insensitively. The payload sits in a single-quoted JS
//! string literal, so every single quote in the CSS is backslash-escaped.
//! Downstream consumers depend on this byte-exactly; nothing else is
//! escaped or reflowed.

use crate::paths;

/// Wrap the final CSS text into a registration statement.
pub fn emit(register_fn: &str, entry_path: &str, css: &str) -> String {
    let key = module_key(entry_path);
    let escaped = css.replace('\'', "\\'");
    format!("{register_fn}('{key}', '{escaped}');")
}

/// Logical module key for an entry path: the path minus a trailing `.css`.
fn module_key(entry_path: &str) -> &str {
    paths::strip_css_suffix(entry_path).unwrap_or(entry_path)
}
