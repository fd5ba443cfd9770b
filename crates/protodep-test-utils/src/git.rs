//! Local git repositories standing in for remote proto dependencies.
//!
//! A clone from a plain filesystem path exercises the same git2 code paths as
//! a network clone, without network access or credentials.

use std::fs;
use std::path::Path;

use git2::{IndexAddOption, Repository, Signature};
use tempfile::TempDir;

/// Branch every fixture repository starts on.
pub const DEFAULT_BRANCH: &str = "master";

/// A real git repository in a temporary directory.
///
/// # Example
///
/// ```rust,no_run
/// use protodep_test_utils::ProtoRepo;
///
/// let repo = ProtoRepo::new();
/// repo.write("protos/foo.proto", "syntax = \"proto3\";\n");
/// let hash = repo.commit("Add foo");
/// assert_eq!(hash.len(), 40);
/// ```
pub struct ProtoRepo {
    temp_dir: TempDir,
    repo: Repository,
}

impl Default for ProtoRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtoRepo {
    /// Initialise an empty repository whose HEAD points at [`DEFAULT_BRANCH`].
    ///
    /// # Panics
    /// Panics if the repository cannot be created.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("ProtoRepo::new: failed to create temp dir");
        let repo = Repository::init(temp_dir.path()).unwrap_or_else(|e| {
            panic!(
                "ProtoRepo::new: failed to init repository at {}: {e}",
                temp_dir.path().display()
            )
        });
        repo.set_head(&format!("refs/heads/{DEFAULT_BRANCH}"))
            .expect("ProtoRepo::new: failed to point HEAD at default branch");
        Self { temp_dir, repo }
    }

    /// Working tree root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// URL that git2 can clone from.
    pub fn url(&self) -> String {
        self.root().to_string_lossy().into_owned()
    }

    /// Write `content` to `path` (relative to the root), creating directories.
    pub fn write(&self, path: &str, content: &str) -> &Self {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("ProtoRepo::write: {}: {e}", full_path.display()));
        self
    }

    /// Delete `path` (relative to the root) from the working tree.
    pub fn remove(&self, path: &str) -> &Self {
        fs::remove_file(self.root().join(path)).unwrap();
        self
    }

    /// Stage every change and commit it on the current branch.
    ///
    /// Returns the full hex id of the new commit.
    pub fn commit(&self, message: &str) -> String {
        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let signature = Signature::now("Test User", "test@test.com").unwrap();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap_or_else(|e| panic!("ProtoRepo::commit: {e}"))
            .to_string()
    }

    /// Create `name` at the current commit and switch to it.
    pub fn checkout_new_branch(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo.branch(name, &head, false).unwrap();
        self.checkout_branch(name);
    }

    /// Switch the working tree to an existing local branch.
    pub fn checkout_branch(&self, name: &str) {
        self.repo.set_head(&format!("refs/heads/{name}")).unwrap();
        self.repo
            .checkout_head(Some(git2::build::CheckoutBuilder::default().force()))
            .unwrap();
    }

    /// Create a lightweight tag at the current commit.
    pub fn tag(&self, name: &str) {
        let head = self.repo.head().unwrap().peel(git2::ObjectType::Commit).unwrap();
        self.repo.tag_lightweight(name, &head, false).unwrap();
    }
}
