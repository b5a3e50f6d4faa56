//! Build configuration module.
//!
//! Handles loading and validating `jcss.toml`. One config file drives the
//! whole run: global engine options plus one or more `[[target]]` groups
//! naming the stylesheets to combine and where to write the emitted JS.
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! charset = '@charset "utf-8";'   # Literal prefix of every combined body
//! base_url = "/"                  # URL prefix for rewritten asset references
//! base_dir = "."                  # Root for versioned relative asset paths
//! register_fn = "jcssReg"         # Call target of the emitted statement
//! debug = false                   # Debug tokens + fatal missing assets
//!
//! # Single-file target: one src entry, one dest file
//! [[target]]
//! src = ["css/pages/home.css"]
//! dest = "build/pages/home.js"
//!
//! # Directory target: cwd + glob patterns, dest is a directory
//! [[target]]
//! cwd = "css/module"
//! src = ["**/*.css"]
//! dest = "build/module"
//! ```
//!
//! All paths are relative to the directory containing the config file.
//! Unknown keys are rejected to catch typos early.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Engine options shared by every target in a run.
///
/// The charset literal, URL/path bases for rewriting, the registration
/// function name, and the debug switch. Built from [`BuildConfig`] by the
/// CLI; constructed directly in tests.
#[derive(Debug, Clone)]
pub struct Options {
    /// Literal text prepended verbatim to every combined stylesheet body.
    pub charset: String,
    /// Absolute URL prefix for every rewritten asset reference.
    pub base_url: String,
    /// Root against which versioned relative asset paths are computed.
    pub base_dir: String,
    /// Identifier used as the call target in the emitted statement.
    pub register_fn: String,
    /// Debug mode: version tokens carry a `debug_` prefix and missing
    /// assets are fatal instead of defaulting to token `"0"`.
    pub debug: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            charset: r#"@charset "utf-8";"#.to_string(),
            base_url: "/".to_string(),
            base_dir: ".".to_string(),
            register_fn: "jcssReg".to_string(),
            debug: false,
        }
    }
}

/// One file group: which stylesheets to combine, and where the JS goes.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Directory mode: `src` entries (and glob patterns) resolve against
    /// this directory, and `dest` is treated as a directory.
    #[serde(default)]
    pub cwd: Option<String>,
    /// Entry points. Literal paths, or `*`/`**` glob patterns when `cwd`
    /// is set.
    pub src: Vec<String>,
    /// Destination file (single-file mode) or directory (directory mode).
    /// A `.css` suffix is swapped for `.js` either way.
    pub dest: String,
}

/// Full parsed `jcss.toml`.
///
/// Top-level keys are the engine options (serde can't combine `flatten`
/// with `deny_unknown_fields`, so the fields live here and [`Options`] is
/// assembled by [`BuildConfig::options`]).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub charset: String,
    pub base_url: String,
    pub base_dir: String,
    pub register_fn: String,
    pub debug: bool,
    #[serde(rename = "target")]
    pub targets: Vec<Target>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        let options = Options::default();
        Self {
            charset: options.charset,
            base_url: options.base_url,
            base_dir: options.base_dir,
            register_fn: options.register_fn,
            debug: options.debug,
            targets: Vec::new(),
        }
    }
}

impl BuildConfig {
    /// Engine options view of this config.
    pub fn options(&self) -> Options {
        Options {
            charset: self.charset.clone(),
            base_url: self.base_url.clone(),
            base_dir: self.base_dir.clone(),
            register_fn: self.register_fn.clone(),
            debug: self.debug,
        }
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate config text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::Validation(
                "no [[target]] groups configured".to_string(),
            ));
        }
        for (i, target) in self.targets.iter().enumerate() {
            if target.src.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "target {}: src must name at least one entry point",
                    i + 1
                )));
            }
            if target.dest.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "target {}: dest must not be empty",
                    i + 1
                )));
            }
            if target.cwd.is_none() {
                if let Some(pattern) = target.src.iter().find(|s| s.contains('*')) {
                    return Err(ConfigError::Validation(format!(
                        "target {}: glob pattern '{}' requires cwd (directory mode)",
                        i + 1,
                        pattern
                    )));
                }
            }
        }
        if !is_register_fn(&self.register_fn) {
            return Err(ConfigError::Validation(format!(
                "register_fn '{}' is not a valid JS identifier path",
                self.register_fn
            )));
        }
        Ok(())
    }
}

/// Accepts dotted JS identifier paths like `jcssReg` or `namespace.jcssReg`.
fn is_register_fn(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
                _ => return false,
            }
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        })
}

/// The documented stock config, printed by `jcss gen-config`.
pub fn stock_config_toml() -> &'static str {
    r#"# jcss configuration
# All top-level options are optional - the values below are the defaults.

# Literal text prepended verbatim to every combined stylesheet body.
charset = '@charset "utf-8";'

# Absolute URL prefix for every rewritten url(...) asset reference.
# References starting with '/' are never rewritten.
base_url = "/"

# Root directory against which versioned relative asset paths are computed.
base_dir = "."

# Name of the runtime registration function in the emitted statement:
#   <register_fn>('<module key>', '<css>');
register_fn = "jcssReg"

# Debug mode: version tokens become 'debug_<reversed token>' and a missing
# asset aborts the build instead of defaulting to '?v=0'.
debug = false

# Each [[target]] maps source stylesheets to emitted JS files.

# Single-file mode: each src entry is a literal path, dest is the output file.
[[target]]
src = ["css/pages/home.css"]
dest = "build/pages/home.js"

# Directory mode: set cwd, then src entries may be glob patterns matched
# against files under cwd. dest is a directory mirroring the matched paths
# (with .css swapped for .js).
#
# [[target]]
# cwd = "css/module"
# src = ["**/*.css"]
# dest = "build/module"
"#
}
