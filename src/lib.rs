//! # jcss
//!
//! A build-time CSS combiner. It flattens a tree of stylesheet sources —
//! recursively inlining every `@import` — into a single minified body,
//! rewrites relative `url(...)` references into absolute URLs carrying a
//! content-derived `?v=<token>` cache-buster, and emits the result as one
//! JS registration statement per entry point:
//!
//! ```text
//! jcssReg('pages/home', '@charset "utf-8";.x{color:red}');
//! ```
//!
//! A runtime module loader evaluates that statement and injects the CSS
//! under the logical key, so stylesheets ship and version like any other
//! JS module.
//!
//! # Pipeline
//!
//! ```text
//! entry.css ─▶ combine (normalize + inline imports + rewrite urls)
//!           ─▶ emit (registration statement)
//!           ─▶ write dest.js
//! ```
//!
//! Each file is normalized and minified exactly once, before its content
//! is spliced into the output; there is no second pass over the combined
//! result. Version tokens are cached for the whole run, so an asset shared
//! by many stylesheets is hashed once.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Driver — expands targets, runs combine → emit → write per entry point |
//! | [`combine`] | Recursive `@import` expansion with inline minification |
//! | [`rewrite`] | Relative `url(...)` → versioned absolute URL rewriting |
//! | [`version`] | MD5-derived 8-character content tokens, cached per run |
//! | [`emit`] | Registration-statement emission (escaping, module keys) |
//! | [`config`] | `jcss.toml` loading, defaults, validation |
//! | [`paths`] | Slash-path algebra: join/relative/glob for project-relative paths |
//! | [`workspace`] | Filesystem seam — [`workspace::Workspace`] trait + disk implementation |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Single-Pass Text Pipeline, No CSS AST
//!
//! The engine deliberately does not parse CSS. Comment stripping, charset
//! removal, whitespace collapse, and import/url matching are text
//! rewrites with carefully bounded patterns. An AST would buy validation
//! this tool explicitly doesn't do, at the cost of fidelity bugs in
//! everything it passes through.
//!
//! ## Content Hashes, Not Build Numbers
//!
//! Asset URLs are versioned by an 8-character token derived from the
//! asset's MD5 digest (see [`version`]), so a URL changes exactly when
//! the bytes behind it change. Deploys that touch nothing keep every
//! cache warm; debug builds get a distinct `debug_`-prefixed token space
//! so they can never poison a release cache.
//!
//! ## Duplicate Imports Are No-Ops
//!
//! Within one entry point, each distinct file is inlined at most once, at
//! the position of its first `@import`; later imports of the same file
//! are silently skipped. This makes shared dependencies (reset sheets,
//! variable sheets) safe to import from every file that needs them, and
//! it is also what guarantees termination on circular imports.
//!
//! ## Filesystem Behind a Trait
//!
//! All file access goes through [`workspace::Workspace`], keeping every
//! engine path a slash-normalized project-relative string and letting the
//! whole pipeline run against an in-memory tree in tests.

pub mod combine;
pub mod config;
pub mod emit;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod rewrite;
pub mod version;
pub mod workspace;
