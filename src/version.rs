//! Content-addressed version tokens for static assets.
//!
//! Every rewritten `url(...)` reference gets a `?v=<token>` suffix so
//! browsers and CDNs cache-bust on content changes, not on deploys. The
//! token is derived from the asset's MD5 digest:
//!
//! 1. Hash the raw bytes (128-bit digest = 16 bytes).
//! 2. Split into 8 big-endian 16-bit groups.
//! 3. From each group take bits 5–10 (`(n >> 5) & 0x3F`).
//! 4. Map each 6-bit value through a fixed 64-character alphabet.
//!
//! The result is always 8 characters from `0-9a-zA-Z-_`, stable for
//! identical content, and cheap to compare in URLs. MD5 is used as a
//! content fingerprint only; nothing here is security-sensitive.
//!
//! ## Missing assets
//!
//! A stylesheet may reference an asset that is generated later or hosted
//! elsewhere. In normal mode the versioner tolerates this: the token
//! defaults to `"0"` and the path is recorded as a warning. In debug mode
//! a missing asset is a hard error, surfaced by the combiner with the
//! referencing stylesheet attached.
//!
//! ## Debug tokens
//!
//! Debug builds reverse the token and prefix it with `debug_`, so a debug
//! artifact can never collide with (or be mistaken for) a release one.
//!
//! ## Caching
//!
//! Tokens are cached per asset path for the lifetime of one run and shared
//! across all entry points, so an icon referenced by twenty stylesheets is
//! hashed once. The cache key has any query suffix stripped first:
//! `img.png?old=1` and `img.png` are the same asset.

use crate::workspace::Workspace;
use md5::{Digest, Md5};
use std::collections::HashMap;
use std::io;
use thiserror::Error;

/// Alphabet for 6-bit token characters, in value order.
const B64_MAP: [char; 64] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', //
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', //
    'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', //
    'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B', 'C', 'D', //
    'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', //
    'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', //
    'Y', 'Z', '-', '_',
];

/// Token returned for a missing asset in normal mode.
const DEFAULT_TOKEN: &str = "0";

#[derive(Error, Debug)]
pub enum VersionError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Asset not found in debug mode. The combiner wraps this with the
    /// referencing stylesheet's path.
    #[error("asset not found: {0}")]
    Missing(String),
}

/// Computes and caches version tokens for one run.
///
/// Owned by the pipeline driver and threaded through every entry point, so
/// the cache survives across targets within a single invocation.
pub struct Versioner<'a> {
    fs: &'a dyn Workspace,
    debug: bool,
    cache: HashMap<String, String>,
    missing: Vec<String>,
}

impl<'a> Versioner<'a> {
    pub fn new(fs: &'a dyn Workspace, debug: bool) -> Self {
        Self {
            fs,
            debug,
            cache: HashMap::new(),
            missing: Vec::new(),
        }
    }

    /// Version token for an asset path.
    ///
    /// Strips any existing query suffix before lookup, so stale `?v=` or
    /// hand-written query strings don't split the cache. Missing assets
    /// yield `"0"` in normal mode and `VersionError::Missing` in debug mode.
    pub fn token(&mut self, asset_path: &str) -> Result<String, VersionError> {
        let path = match asset_path.split_once('?') {
            Some((p, _)) => p,
            None => asset_path,
        };
        if let Some(cached) = self.cache.get(path) {
            return Ok(cached.clone());
        }

        let token = match self.fs.read_bytes(path) {
            Ok(bytes) => derive_token(&bytes, self.debug),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if self.debug {
                    return Err(VersionError::Missing(path.to_string()));
                }
                self.missing.push(path.to_string());
                DEFAULT_TOKEN.to_string()
            }
            Err(err) => return Err(err.into()),
        };

        self.cache.insert(path.to_string(), token.clone());
        Ok(token)
    }

    /// Asset paths that fell back to the default token, in first-seen order.
    pub fn missing_assets(&self) -> &[String] {
        &self.missing
    }
}

/// Derive a token from raw content bytes.
///
/// Release form: 8 alphabet characters, one per 16-bit digest group.
/// Debug form: the release token reversed, prefixed with `debug_`.
fn derive_token(bytes: &[u8], debug: bool) -> String {
    let digest = Md5::digest(bytes);
    let mut token = String::with_capacity(8);
    for pair in digest.chunks_exact(2) {
        let n = u16::from_be_bytes([pair[0], pair[1]]);
        token.push(B64_MAP[usize::from((n >> 5) & 0x3F)]);
    }
    if debug {
        format!("debug_{}", token.chars().rev().collect::<String>())
    } else {
        token
    }
}
