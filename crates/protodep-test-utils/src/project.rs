//! [`TestProject`] builder for resolver scenarios.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// A temporary project directory plus a separate temporary home directory
/// (which holds the `.protodep` cache).
///
/// # Example
///
/// ```rust,no_run
/// use protodep_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.write_manifest("proto_outdir = \"./proto\"\n");
/// project.assert_file_exists("protodep.toml");
/// ```
pub struct TestProject {
    root: TempDir,
    home: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
            home: TempDir::new().unwrap(),
        }
    }

    /// Project directory: manifest, lock file and output tree live here.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Home directory used for the dependency cache and `.ssh`.
    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// Write `protodep.toml`.
    pub fn write_manifest(&self, content: &str) {
        fs::write(self.root().join("protodep.toml"), content).unwrap();
    }

    /// Write `protodep.lock`.
    pub fn write_lock(&self, content: &str) {
        fs::write(self.root().join("protodep.lock"), content).unwrap();
    }

    /// Read a file relative to the project root.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Assert that `path` (relative to the project root) exists.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the project root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {path} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}
