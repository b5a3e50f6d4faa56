//! Recursive `@import` combination with inline minification.
//!
//! The heart of the engine. One entry point goes in, one flattened and
//! minified stylesheet body comes out, with every `@import` replaced in
//! place by the (recursively combined) content of the imported file.
//!
//! ## Per-file pipeline
//!
//! Each file's raw text is normalized exactly once before line-splitting:
//!
//! 1. strip a leading byte-order-mark
//! 2. strip block comments (`/* ... */`, non-greedy, spanning lines)
//! 3. strip `@charset` declarations (the configured charset literal is
//!    prepended once at the entry-point level instead)
//! 4. collapse insignificant whitespace: none around `{ } : ; ,`, none
//!    before `!important`, no `;` before `}`, no runs of spaces, trimmed
//! 5. force every `@import` statement onto its own line
//! 6. split on newlines and process line by line
//!
//! There is no second minification pass over the combined result — each
//! file is minified before splicing, and splicing adds no whitespace.
//!
//! ## Import handling
//!
//! A line that is an `@import` of a non-root-relative target resolves the
//! target against the importing file's directory. A missing target is a
//! hard error naming both files. A target already imported within this
//! entry point is silently skipped — repeated imports are idempotent no-ops.
//! The already-imported set is checked *before* recursing and is seeded
//! with the entry path itself, so circular imports (direct or transitive)
//! terminate with at most one inclusion per distinct path.
//!
//! Content lines get their `url(...)` references rewritten (see
//! [`rewrite`](crate::rewrite)) and are appended to the output buffer.
//! The final body is the charset literal plus all buffered lines joined
//! with no separator; the line structure was only ever a parsing aid.

use crate::config::Options;
use crate::paths;
use crate::rewrite::rewrite_urls;
use crate::version::{VersionError, Versioner};
use crate::workspace::Workspace;
use regex::Regex;
use std::collections::HashSet;
use std::io;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CombineError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("{importer}: imported stylesheet not found: {target}")]
    MissingImport { importer: String, target: String },
    #[error("{stylesheet}: referenced asset not found: {asset}")]
    MissingAsset { stylesheet: String, asset: String },
}

/// Character class of an import target (quotes excluded so the capture
/// never swallows a closing quote).
const IMPORT_TARGET: &str = r"[0-9A-Za-z_\-./?=]+";

/// Combines entry points, sharing one version cache across calls.
///
/// The driver creates one `Combiner` per run and calls
/// [`Combiner::combine`] once per entry point; the already-imported set is
/// fresh per call, the versioner persists.
pub struct Combiner<'a> {
    fs: &'a dyn Workspace,
    options: &'a Options,
    versioner: Versioner<'a>,
}

impl<'a> Combiner<'a> {
    pub fn new(fs: &'a dyn Workspace, options: &'a Options) -> Self {
        Self {
            fs,
            options,
            versioner: Versioner::new(fs, options.debug),
        }
    }

    /// Combine one entry point into its final stylesheet body.
    ///
    /// The result is the configured charset literal followed by the
    /// flattened, minified content of the entry file and everything it
    /// (transitively) imports, in declaration order.
    pub fn combine(&mut self, entry: &str) -> Result<String, CombineError> {
        let mut imported = HashSet::new();
        imported.insert(entry.to_string());
        let mut buffer = String::new();
        self.combine_into(entry, &mut imported, &mut buffer)?;
        Ok(format!("{}{}", self.options.charset, buffer))
    }

    /// Asset paths that fell back to the default version token so far.
    pub fn missing_assets(&self) -> &[String] {
        self.versioner.missing_assets()
    }

    fn combine_into(
        &mut self,
        path: &str,
        imported: &mut HashSet<String>,
        buffer: &mut String,
    ) -> Result<(), CombineError> {
        let dir = paths::dirname(path);
        let text = normalize(&self.fs.read(path)?);

        for line in text.split('\n').filter(|l| !l.is_empty()) {
            match import_target(line) {
                Some(target) => {
                    let resolved = paths::join_normalize(dir, target);
                    if !self.fs.exists(&resolved) {
                        return Err(CombineError::MissingImport {
                            importer: path.to_string(),
                            target: resolved,
                        });
                    }
                    if imported.insert(resolved.clone()) {
                        self.combine_into(&resolved, imported, buffer)?;
                    }
                }
                None => {
                    let rewritten = rewrite_urls(line, dir, self.options, &mut self.versioner)
                        .map_err(|err| attach_stylesheet(err, path))?;
                    buffer.push_str(&rewritten);
                }
            }
        }
        Ok(())
    }
}

/// Map a version-lookup failure to a combine error naming the stylesheet
/// the offending reference appeared in.
fn attach_stylesheet(err: VersionError, stylesheet: &str) -> CombineError {
    match err {
        VersionError::Io(io) => CombineError::Io(io),
        VersionError::Missing(asset) => CombineError::MissingAsset {
            stylesheet: stylesheet.to_string(),
            asset,
        },
    }
}

/// The single normalization pass applied to each file's raw text.
fn normalize(raw: &str) -> String {
    static RE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
    static RE_CHARSET: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)@charset[^;]*;").unwrap());
    static RE_PUNCT_WS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s*([{}:;,])\s*").unwrap());
    static RE_IMPORTANT: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)\s+!important").unwrap());
    static RE_SEMI_BRACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r";\}").unwrap());
    static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());
    static RE_IMPORT_STMT: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(&format!(
            r#"(?i)@import\s*(?:url\(\s*)?["']?{IMPORT_TARGET}["']?\s*\)?\s*;"#
        ))
        .unwrap()
    });

    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let text = RE_COMMENT.replace_all(text, "");
    let text = RE_CHARSET.replace_all(&text, "");
    let text = RE_PUNCT_WS.replace_all(&text, "$1");
    let text = RE_IMPORTANT.replace_all(&text, "!important");
    let text = RE_SEMI_BRACE.replace_all(&text, "}");
    let text = RE_SPACES.replace_all(&text, " ");
    // Isolate imports on their own lines so the line processor can treat
    // them atomically even though the rest of the file is minified.
    let text = RE_IMPORT_STMT.replace_all(&text, |caps: &regex::Captures| {
        format!("\n{}\n", &caps[0])
    });
    text.trim().to_string()
}

/// Target of an `@import` line, if this line is a resolvable import.
///
/// Accepts `@import "x.css";`, `@import 'x.css';`, `@import url(x.css);`,
/// and the quoted-url combinations. Root-relative targets (leading `/`)
/// are excluded from resolution and leave the line as content.
fn import_target(line: &str) -> Option<&str> {
    static RE_IMPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(&format!(
            r#"(?i)^\s*@import\s*(?:url\(\s*)?["']?({IMPORT_TARGET})["']?\s*\)?\s*;\s*$"#
        ))
        .unwrap()
    });
    let target = RE_IMPORT_LINE.captures(line)?.get(1)?.as_str();
    (!target.starts_with('/')).then_some(target)
}
