//! Filesystem collaborator trait and the production disk implementation.
//!
//! The engine never touches `std::fs` directly. Everything goes through the
//! [`Workspace`] trait so the combiner, versioner, and driver can be tested
//! against an in-memory tree, and so every path stays a slash-normalized
//! project-relative string (see [`paths`](crate::paths)) until the last
//! possible moment.
//!
//! The production implementation is [`DiskWorkspace`], rooted at the
//! directory containing the config file. Writes create parent directories
//! as needed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Filesystem operations the engine consumes.
///
/// `read` and `read_bytes` fail with `io::ErrorKind::NotFound` for missing
/// paths; callers that tolerate absence check `exists` or match on the kind.
/// `walk` supports directory-mode targets: it lists every file under a
/// directory, as slash paths relative to that directory.
pub trait Workspace {
    /// Read a stylesheet as UTF-8 text.
    fn read(&self, path: &str) -> io::Result<String>;

    /// Read a static asset's raw bytes (for content hashing).
    fn read_bytes(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Whether a file exists at this path.
    fn exists(&self, path: &str) -> bool;

    /// Write an output file, creating parent directories as needed.
    fn write(&self, path: &str, text: &str) -> io::Result<()>;

    /// List all files under `dir`, relative to `dir`, slash-separated.
    fn walk(&self, dir: &str) -> io::Result<Vec<String>>;
}

/// Production workspace rooted at the project directory.
pub struct DiskWorkspace {
    root: PathBuf,
}

impl DiskWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl Workspace for DiskWorkspace {
    fn read(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(self.resolve(path))
    }

    fn read_bytes(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn write(&self, path: &str, text: &str) -> io::Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, text)
    }

    fn walk(&self, dir: &str) -> io::Result<Vec<String>> {
        let base = self.resolve(dir);
        let mut files = Vec::new();
        for entry in WalkDir::new(&base).sort_by_file_name() {
            // Keep the underlying error kind; callers distinguish a
            // missing directory from other walk failures.
            let entry = entry.map_err(|err| {
                err.into_io_error()
                    .unwrap_or_else(|| io::Error::other("filesystem loop during walk"))
            })?;
            if entry.file_type().is_file() {
                files.push(slash_relative(entry.path(), &base));
            }
        }
        Ok(files)
    }
}

/// Render `path` relative to `base` with forward slashes.
fn slash_relative(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    /// In-memory workspace for engine tests.
    ///
    /// Files are seeded up front; writes are recorded so tests can assert
    /// on emitted output (or its absence) without touching the disk.
    #[derive(Default)]
    pub struct MemWorkspace {
        files: BTreeMap<String, Vec<u8>>,
        pub writes: RefCell<BTreeMap<String, String>>,
    }

    impl MemWorkspace {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
            self.files.insert(path.to_string(), content.into());
            self
        }

        pub fn written(&self, path: &str) -> Option<String> {
            self.writes.borrow().get(path).cloned()
        }
    }

    impl Workspace for MemWorkspace {
        fn read(&self, path: &str) -> io::Result<String> {
            let bytes = self.read_bytes(path)?;
            String::from_utf8(bytes).map_err(io::Error::other)
        }

        fn read_bytes(&self, path: &str) -> io::Result<Vec<u8>> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
        }

        fn exists(&self, path: &str) -> bool {
            self.files.contains_key(path)
        }

        fn write(&self, path: &str, text: &str) -> io::Result<()> {
            self.writes.borrow_mut().insert(path.to_string(), text.to_string());
            Ok(())
        }

        fn walk(&self, dir: &str) -> io::Result<Vec<String>> {
            let prefix = format!("{dir}/");
            let files: Vec<String> = self
                .files
                .keys()
                .filter_map(|k| k.strip_prefix(&prefix))
                .map(str::to_string)
                .collect();
            if files.is_empty() {
                // No seeded file lives under this directory, so as far as
                // the mock is concerned it doesn't exist.
                return Err(io::Error::new(io::ErrorKind::NotFound, dir.to_string()));
            }
            Ok(files)
        }
    }

    // =========================================================================
    // DiskWorkspace
    // =========================================================================

    #[test]
    fn disk_read_and_exists() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.css"), ".x{}").unwrap();
        let ws = DiskWorkspace::new(tmp.path());

        assert!(ws.exists("a.css"));
        assert!(!ws.exists("b.css"));
        assert_eq!(ws.read("a.css").unwrap(), ".x{}");
    }

    #[test]
    fn disk_read_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let ws = DiskWorkspace::new(tmp.path());
        let err = ws.read("missing.css").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn disk_write_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let ws = DiskWorkspace::new(tmp.path());
        ws.write("build/pages/home.js", "reg('x','y');").unwrap();
        assert_eq!(
            fs::read_to_string(tmp.path().join("build/pages/home.js")).unwrap(),
            "reg('x','y');"
        );
    }

    #[test]
    fn disk_walk_missing_dir_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let ws = DiskWorkspace::new(tmp.path());
        let err = ws.walk("nope").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn disk_walk_lists_nested_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("css/pages")).unwrap();
        fs::write(tmp.path().join("css/a.css"), "").unwrap();
        fs::write(tmp.path().join("css/pages/b.css"), "").unwrap();
        let ws = DiskWorkspace::new(tmp.path());

        let files = ws.walk("css").unwrap();
        assert_eq!(files, vec!["a.css".to_string(), "pages/b.css".to_string()]);
    }

    // =========================================================================
    // MemWorkspace (sanity for other modules' tests)
    // =========================================================================

    #[test]
    fn mem_records_writes() {
        let ws = MemWorkspace::new().file("a.css", ".x{}");
        ws.write("out.js", "reg();").unwrap();
        assert_eq!(ws.written("out.js").as_deref(), Some("reg();"));
        assert_eq!(ws.written("other.js"), None);
    }

    #[test]
    fn mem_walk_is_prefix_scoped() {
        let ws = MemWorkspace::new()
            .file("css/a.css", "")
            .file("css/pages/b.css", "")
            .file("img/x.png", "");
        assert_eq!(
            ws.walk("css").unwrap(),
            vec!["a.css".to_string(), "pages/b.css".to_string()]
        );
    }
}
