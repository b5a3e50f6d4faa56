//! Relative `url(...)` rewriting into versioned absolute URLs.
//!
//! Given one minified content line and the directory of the stylesheet it
//! came from, every relative reference becomes
//! `base_url + <path relative to base_dir> + "?v=" + <token>`:
//!
//! ```text
//! url(../img/x.png)  →  url(http://cdn/img/x.png?v=AbCd1234)
//! ```
//!
//! ## What gets rewritten
//!
//! A reference participates only when it is a plain relative file path:
//!
//! - not starting with `/` — root-relative and protocol-relative URLs are
//!   assumed resolvable by the consuming runtime and pass through untouched,
//!   with no version lookup;
//! - composed entirely of `[0-9A-Za-z_\-./?=#]`. Anything outside that
//!   class, like `data:` URIs or references with embedded spaces, passes
//!   through untouched.
//!
//! Quoting is preserved: only the reference substring inside the matched
//! `url(...)` is replaced. An existing query string is dropped in favor of
//! the version query; a fragment is dropped entirely.

use crate::config::Options;
use crate::paths;
use crate::version::{VersionError, Versioner};
use regex::Regex;
use std::sync::LazyLock;

/// Rewrite all qualifying `url(...)` references in one content line.
///
/// `current_dir` is the directory of the stylesheet the line came from;
/// relative references resolve against it. Version lookups go through the
/// shared `versioner` so every target in a run hits one cache.
pub fn rewrite_urls(
    line: &str,
    current_dir: &str,
    options: &Options,
    versioner: &mut Versioner<'_>,
) -> Result<String, VersionError> {
    static RE_URL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)url\(([^()]*)\)").unwrap());

    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for caps in RE_URL.captures_iter(line) {
        let whole = caps.get(0).unwrap();
        out.push_str(&line[last..whole.start()]);
        last = whole.end();

        match extract_reference(&caps[1]) {
            Some(reference) => {
                let absolute = versioned_url(reference, current_dir, options, versioner)?;
                // Replace only the reference substring, keeping the
                // url( / quoting / ) structure as written.
                out.push_str(&whole.as_str().replacen(reference, &absolute, 1));
            }
            None => out.push_str(whole.as_str()),
        }
    }
    out.push_str(&line[last..]);
    Ok(out)
}

/// Pull the rewritable reference out of the text between `url(` and `)`.
///
/// Returns `None` when the reference should pass through: root-relative,
/// mismatched quotes, or characters outside the reference class.
fn extract_reference(inner: &str) -> Option<&str> {
    let trimmed = inner.trim();
    let reference = match trimmed.as_bytes() {
        [q @ (b'\'' | b'"'), .., last] if last == q => &trimmed[1..trimmed.len() - 1],
        [b'\'' | b'"', ..] | [.., b'\'' | b'"'] => return None,
        _ => trimmed,
    };
    if reference.is_empty() || reference.starts_with('/') {
        return None;
    }
    let in_class = |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '?' | '=' | '#')
    };
    reference.chars().all(in_class).then_some(reference)
}

/// Resolve a relative reference and build its versioned absolute URL.
fn versioned_url(
    reference: &str,
    current_dir: &str,
    options: &Options,
    versioner: &mut Versioner<'_>,
) -> Result<String, VersionError> {
    let (file_path, _query, _fragment) = paths::split_reference(reference);
    let resolved = paths::join_normalize(current_dir, file_path);
    let relative = paths::relative_to(&options.base_dir, &resolved);
    let token = versioner.token(&resolved)?;
    Ok(format!("{}{}?v={}", options.base_url, relative, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::tests::MemWorkspace;

    fn options() -> Options {
        Options {
            base_url: "http://cdn/".to_string(),
            base_dir: ".".to_string(),
            ..Options::default()
        }
    }

    fn rewrite(ws: &MemWorkspace, line: &str, dir: &str) -> String {
        let options = options();
        let mut versioner = Versioner::new(ws, false);
        rewrite_urls(line, dir, &options, &mut versioner).unwrap()
    }

    fn token_for(ws: &MemWorkspace, asset: &str) -> String {
        Versioner::new(ws, false).token(asset).unwrap()
    }

    // =========================================================================
    // Rewriting
    // =========================================================================

    #[test]
    fn relative_reference_becomes_versioned_absolute() {
        let ws = MemWorkspace::new().file("img/x.png", b"png".to_vec());
        let token = token_for(&ws, "img/x.png");
        let out = rewrite(&ws, ".a{background:url(../img/x.png)}", "css");
        assert_eq!(out, format!(".a{{background:url(http://cdn/img/x.png?v={token})}}"));
    }

    #[test]
    fn quoting_is_preserved() {
        let ws = MemWorkspace::new().file("img/x.png", b"png".to_vec());
        let token = token_for(&ws, "img/x.png");
        let out = rewrite(&ws, r#".a{background:url("x.png")}"#, "img");
        assert_eq!(out, format!(r#".a{{background:url("http://cdn/img/x.png?v={token}")}}"#));

        let out = rewrite(&ws, ".a{background:url('x.png')}", "img");
        assert_eq!(out, format!(".a{{background:url('http://cdn/img/x.png?v={token}')}}"));
    }

    #[test]
    fn multiple_references_in_one_line() {
        let ws = MemWorkspace::new()
            .file("img/a.png", b"a".to_vec())
            .file("img/b.png", b"b".to_vec());
        let out = rewrite(&ws, ".a{background:url(a.png) url(b.png)}", "img");
        assert!(out.contains("url(http://cdn/img/a.png?v="));
        assert!(out.contains("url(http://cdn/img/b.png?v="));
    }

    #[test]
    fn existing_query_is_replaced_by_version() {
        let ws = MemWorkspace::new().file("img/x.png", b"png".to_vec());
        let token = token_for(&ws, "img/x.png");
        let out = rewrite(&ws, "url(x.png?old=v)", "img");
        assert_eq!(out, format!("url(http://cdn/img/x.png?v={token})"));
    }

    #[test]
    fn fragment_is_dropped() {
        let ws = MemWorkspace::new().file("fonts/icons.svg", b"svg".to_vec());
        let token = token_for(&ws, "fonts/icons.svg");
        let out = rewrite(&ws, "url(icons.svg#glyph)", "fonts");
        assert_eq!(out, format!("url(http://cdn/fonts/icons.svg?v={token})"));
    }

    #[test]
    fn base_dir_controls_relative_path() {
        let ws = MemWorkspace::new().file("static/img/x.png", b"png".to_vec());
        let mut opts = options();
        opts.base_dir = "static".to_string();
        let mut versioner = Versioner::new(&ws, false);
        let out = rewrite_urls("url(../img/x.png)", "static/css", &opts, &mut versioner).unwrap();
        assert!(out.starts_with("url(http://cdn/img/x.png?v="), "got: {out}");
    }

    // =========================================================================
    // Pass-through
    // =========================================================================

    #[test]
    fn root_relative_reference_passes_through() {
        let ws = MemWorkspace::new();
        let line = ".a{background:url(/img/x.png)}";
        assert_eq!(rewrite(&ws, line, "css"), line);
        // And never triggers a version lookup.
        let mut versioner = Versioner::new(&ws, false);
        rewrite_urls(line, "css", &options(), &mut versioner).unwrap();
        assert!(versioner.missing_assets().is_empty());
    }

    #[test]
    fn data_uri_passes_through() {
        let ws = MemWorkspace::new();
        let line = ".a{background:url(data:image/png;base64,iVBOR=)}";
        assert_eq!(rewrite(&ws, line, "css"), line);
    }

    #[test]
    fn mismatched_quotes_pass_through() {
        let ws = MemWorkspace::new();
        let line = ".a{background:url('x.png)}";
        assert_eq!(rewrite(&ws, line, "css"), line);
    }

    #[test]
    fn line_without_urls_is_unchanged() {
        let ws = MemWorkspace::new();
        assert_eq!(rewrite(&ws, ".a{color:red}", "css"), ".a{color:red}");
    }

    // =========================================================================
    // Missing assets
    // =========================================================================

    #[test]
    fn missing_asset_gets_default_token_in_release() {
        let ws = MemWorkspace::new();
        let out = rewrite(&ws, "url(gone.png)", "img");
        assert_eq!(out, "url(http://cdn/img/gone.png?v=0)");
    }

    #[test]
    fn missing_asset_is_fatal_in_debug() {
        let ws = MemWorkspace::new();
        let mut versioner = Versioner::new(&ws, true);
        let err = rewrite_urls("url(gone.png)", "img", &options(), &mut versioner).unwrap_err();
        assert!(matches!(err, VersionError::Missing(path) if path == "img/gone.png"));
    }
}
