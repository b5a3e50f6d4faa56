//! Pipeline driver: targets in, emitted JS files out.
//!
//! For each configured target, each source entry is combined, emitted, and
//! written. Two target shapes exist:
//!
//! - **Single-file mode** (no `cwd`): each `src` entry is a literal entry
//!   path, `dest` is the output file (`.css` swapped for `.js`).
//! - **Directory mode** (`cwd` set): `src` entries resolve against `cwd`
//!   and may be glob patterns; `dest` is a directory and each output
//!   mirrors the matched relative path with `.css` swapped for `.js`.
//!
//! The emitter always receives the *original* relative path (the matched
//! or configured `src` entry, not the cwd-joined one) as the module key
//! source, so keys stay stable regardless of where the CSS tree lives.
//!
//! Output is all-or-nothing per entry point: the destination is written
//! only after combination and emission fully succeed, and the run aborts
//! on the first failing entry point, so a failed build never leaves a
//! partial or corrupt artifact behind.

use crate::combine::{CombineError, Combiner};
use crate::config::{BuildConfig, Target};
use crate::emit::emit;
use crate::paths;
use crate::workspace::Workspace;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("{entry}: {source}")]
    Entry {
        entry: String,
        #[source]
        source: CombineError,
    },
    #[error("target cwd not found: {0}")]
    MissingCwd(String),
}

/// One emitted output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    /// Entry stylesheet path, project-relative.
    pub entry: String,
    /// Destination JS path, project-relative.
    pub dest: String,
    /// Size of the written statement in bytes.
    pub bytes: usize,
}

/// What a run produced, for CLI reporting.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub outputs: Vec<EmittedFile>,
    /// Assets that fell back to the default version token (release mode).
    pub missing_assets: Vec<String>,
}

/// Run the full pipeline for every target in the config.
pub fn build(fs: &dyn Workspace, config: &BuildConfig) -> Result<BuildReport, PipelineError> {
    let options = config.options();
    let mut combiner = Combiner::new(fs, &options);
    let mut report = BuildReport::default();

    for target in &config.targets {
        for (entry, original, dest) in expand_target(fs, target)? {
            let css = combiner
                .combine(&entry)
                .map_err(|source| PipelineError::Entry {
                    entry: entry.clone(),
                    source,
                })?;
            let statement = emit(&options.register_fn, &original, &css);
            fs.write(&dest, &statement)?;
            report.outputs.push(EmittedFile {
                entry,
                dest,
                bytes: statement.len(),
            });
        }
    }

    report.missing_assets = combiner.missing_assets().to_vec();
    Ok(report)
}

/// Resolve a target into `(entry path, original relative path, dest path)`
/// triples, expanding glob patterns in directory mode.
fn expand_target(
    fs: &dyn Workspace,
    target: &Target,
) -> Result<Vec<(String, String, String)>, PipelineError> {
    match &target.cwd {
        Some(cwd) => {
            let available = fs.walk(cwd).map_err(|err| {
                if err.kind() == io::ErrorKind::NotFound {
                    PipelineError::MissingCwd(cwd.clone())
                } else {
                    PipelineError::Io(err)
                }
            })?;
            let mut triples = Vec::new();
            for src in &target.src {
                if src.contains('*') {
                    for rel in available.iter().filter(|rel| paths::glob_match(src, rel)) {
                        triples.push(dir_mode_triple(cwd, rel, &target.dest));
                    }
                } else {
                    triples.push(dir_mode_triple(cwd, src, &target.dest));
                }
            }
            Ok(triples)
        }
        None => Ok(target
            .src
            .iter()
            .map(|src| (src.clone(), src.clone(), paths::css_to_js(&target.dest)))
            .collect()),
    }
}

fn dir_mode_triple(cwd: &str, rel: &str, dest: &str) -> (String, String, String) {
    (
        paths::join_normalize(cwd, rel),
        rel.to_string(),
        paths::css_to_js(&paths::join_normalize(dest, rel)),
    )
}
