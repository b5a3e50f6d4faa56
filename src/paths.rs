//! Slash-path algebra for project-relative source paths.
//!
//! Every path the engine handles is a **source path**: slash-separated,
//! relative to the project root (the directory containing `jcss.toml`).
//! Source paths are plain strings, never `std::path::Path` — they double as
//! cache keys and as URL path segments, so their textual form matters.
//! Conversion to real filesystem paths happens only inside the
//! [`Workspace`](crate::workspace::Workspace) implementations.
//!
//! A path starting with `/` is root-relative from the consuming runtime's
//! point of view; the engine never resolves or rewrites those.

/// Directory portion of a source path, or `"."` for a bare filename.
///
/// - `"css/pages/home.css"` → `"css/pages"`
/// - `"home.css"` → `"."`
pub fn dirname(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => dir,
        Some(_) => "/",
        None => ".",
    }
}

/// Join a relative reference onto a directory and normalize the result.
///
/// `.` segments are dropped, `..` segments pop the previous component.
/// Leading `..` segments that escape the root are kept — references above
/// the stylesheet tree are legal and resolve from wherever the root is:
///
/// - `join_normalize("css", "../img/x.png")` → `"img/x.png"`
/// - `join_normalize(".", "a.css")` → `"a.css"`
/// - `join_normalize("a/b", "../../../x")` → `"../x"`
pub fn join_normalize(dir: &str, rel: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in dir.split('/').chain(rel.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(stack.last(), Some(&"..") | None) {
                    stack.push("..");
                } else {
                    stack.pop();
                }
            }
            other => stack.push(other),
        }
    }
    if stack.is_empty() {
        ".".to_string()
    } else {
        stack.join("/")
    }
}

/// Express `path` relative to `base`, both slash-normalized.
///
/// Mirrors Node's `path.relative`: shared leading components are removed,
/// and each remaining `base` component becomes a `..` hop.
///
/// - `relative_to(".", "img/x.png")` → `"img/x.png"`
/// - `relative_to("static", "static/img/x.png")` → `"img/x.png"`
/// - `relative_to("static/css", "static/img/x.png")` → `"../img/x.png"`
pub fn relative_to(base: &str, path: &str) -> String {
    let base_parts: Vec<&str> = base.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty() && *s != ".").collect();

    let common = base_parts
        .iter()
        .zip(path_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    for _ in common..base_parts.len() {
        parts.push("..");
    }
    parts.extend(&path_parts[common..]);
    parts.join("/")
}

/// Strip a trailing `.css` suffix, case-insensitively.
///
/// Returns `None` when the path does not end in `.css`, so callers can
/// distinguish "not a stylesheet path" from an empty stem.
pub fn strip_css_suffix(path: &str) -> Option<&str> {
    let stem_len = path.len().checked_sub(4)?;
    // Paths may contain multi-byte characters, so the cut point must be
    // checked before slicing.
    if path.is_char_boundary(stem_len) && path[stem_len..].eq_ignore_ascii_case(".css") {
        Some(&path[..stem_len])
    } else {
        None
    }
}

/// Swap a trailing `.css` for `.js`; paths without the suffix pass through.
///
/// Applied to destination paths in both single-file and directory mode,
/// so a `dest` already ending in `.js` is left alone.
pub fn css_to_js(path: &str) -> String {
    match strip_css_suffix(path) {
        Some(stem) => format!("{stem}.js"),
        None => path.to_string(),
    }
}

/// Split a reference into (file path, query string, fragment).
///
/// The fragment starts at the first `#`, the query at the first `?` before
/// it. Both returned without their leading marker characters; empty when
/// absent. Only the file path participates in resolution and hashing.
pub fn split_reference(reference: &str) -> (&str, &str, &str) {
    let (before_frag, fragment) = match reference.split_once('#') {
        Some((b, f)) => (b, f),
        None => (reference, ""),
    };
    let (path, query) = match before_frag.split_once('?') {
        Some((p, q)) => (p, q),
        None => (before_frag, ""),
    };
    (path, query, fragment)
}

/// Match a slash path against a glob pattern.
///
/// Supports the two forms target `src` arrays use:
/// - `*` matches any run of characters within one segment
/// - `**` as a whole segment matches zero or more segments
///
/// Anything else is literal. Patterns without wildcards should be treated
/// as plain paths by the caller and never reach this function, but they
/// match themselves here regardless.
pub fn glob_match(pattern: &str, path: &str) -> bool {
    let pat: Vec<&str> = pattern.split('/').collect();
    let segs: Vec<&str> = path.split('/').collect();
    match_segments(&pat, &segs)
}

fn match_segments(pat: &[&str], segs: &[&str]) -> bool {
    match pat.split_first() {
        None => segs.is_empty(),
        Some((&"**", rest)) => {
            // `**` may consume zero or more leading segments.
            (0..=segs.len()).any(|skip| match_segments(rest, &segs[skip..]))
        }
        Some((first, rest)) => match segs.split_first() {
            Some((seg, seg_rest)) => match_one(first, seg) && match_segments(rest, seg_rest),
            None => false,
        },
    }
}

/// Match a single segment against a pattern segment containing `*` wildcards.
fn match_one(pat: &str, seg: &str) -> bool {
    let parts: Vec<&str> = pat.split('*').collect();
    if parts.len() == 1 {
        return pat == seg;
    }
    let mut pos = 0;
    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            if !seg.starts_with(part) {
                return false;
            }
            pos = part.len();
        } else if i == parts.len() - 1 {
            return seg.len() >= pos && seg[pos..].ends_with(part);
        } else if let Some(found) = seg[pos..].find(part) {
            pos += found + part.len();
        } else {
            return false;
        }
    }
    true
}
