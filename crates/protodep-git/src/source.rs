//! The repository source seam used by the resolver

use crate::{AuthMethod, Result};
use protodep_fs::NormalizedPath;
use protodep_meta::Dependency;

/// A dependency checked out locally at a known commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedRepository {
    /// The dependency as declared in the manifest
    pub dependency: Dependency,

    /// Full hex id of the checked-out commit
    pub hash: String,

    proto_root: NormalizedPath,
}

impl OpenedRepository {
    pub fn new(dependency: Dependency, hash: impl Into<String>, proto_root: NormalizedPath) -> Self {
        Self {
            dependency,
            hash: hash.into(),
            proto_root,
        }
    }

    /// Directory holding the dependency's `.proto` files: the checkout root
    /// plus the target's sub-path.
    pub fn proto_root_dir(&self) -> &NormalizedPath {
        &self.proto_root
    }
}

/// Something that can materialize a dependency on the local filesystem.
///
/// Implementations handle transport and caching; the resolver only walks the
/// returned [`OpenedRepository::proto_root_dir`].
pub trait RepositorySource {
    /// Fetch `dependency` into `cache_dir` and check out its revision.
    ///
    /// - `cache_dir`: root of the per-user dependency cache
    /// - `auth`: strategy selected for this dependency
    fn open(
        &self,
        cache_dir: &NormalizedPath,
        dependency: &Dependency,
        auth: &AuthMethod,
    ) -> Result<OpenedRepository>;
}
