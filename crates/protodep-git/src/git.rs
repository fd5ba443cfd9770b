//! git2-backed repository source with an on-disk clone cache
//!
//! Cache layout: one checkout per repository at `<cache_dir>/<host>/<owner>/<name>`.
//! An existing checkout is fetched instead of cloned again.

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{AutotagOption, Commit, FetchOptions, Repository};
use protodep_fs::{NormalizedPath, io};
use protodep_meta::Dependency;

use crate::source::{OpenedRepository, RepositorySource};
use crate::{AuthMethod, Error, Result};

/// Branch checked out when neither the manifest nor the remote names one.
const FALLBACK_BRANCH: &str = "master";

const REMOTE: &str = "origin";

/// Repository source that clones over git into a local cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitSource;

impl GitSource {
    pub fn new() -> Self {
        Self
    }

    /// Open `dependency` using an explicit remote URL instead of the one
    /// derived from `auth`. Used for mirrors and local repositories.
    pub fn open_from_url(
        &self,
        cache_dir: &NormalizedPath,
        dependency: &Dependency,
        url: &str,
        auth: &AuthMethod,
    ) -> Result<OpenedRepository> {
        let repository = dependency.repository();
        let repo_path = cache_dir.join(&repository);

        let repo = if repo_path.is_dir() {
            tracing::info!(repository = %repository, "Getting in local cache");
            fetch_existing(&repo_path, &repository, auth)?
        } else {
            tracing::info!(repository = %repository, url = %url, "Cloning");
            clone_fresh(&repo_path, url, auth)?
        };

        let commit = resolve_commit(&repo, dependency, &repository)?;
        repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::default().force()))?;
        repo.set_head_detached(commit.id())?;

        let hash = commit.id().to_string();
        if dependency.is_pinned() {
            tracing::info!(
                repository = %repository,
                hash = %hash,
                revision = %dependency.revision,
                "Checked out pinned revision"
            );
        } else {
            tracing::info!(repository = %repository, hash = %hash, "Checked out branch head");
        }

        Ok(OpenedRepository::new(
            dependency.clone(),
            hash,
            cache_dir.join(&dependency.target),
        ))
    }
}

impl RepositorySource for GitSource {
    fn open(
        &self,
        cache_dir: &NormalizedPath,
        dependency: &Dependency,
        auth: &AuthMethod,
    ) -> Result<OpenedRepository> {
        let url = auth.repository_url(&dependency.repository());
        self.open_from_url(cache_dir, dependency, &url, auth)
    }
}

fn fetch_options(auth: &AuthMethod) -> FetchOptions<'_> {
    let mut options = FetchOptions::new();
    options.remote_callbacks(auth.remote_callbacks());
    options.download_tags(AutotagOption::All);
    options
}

/// Clone `url` into `repo_path`, removing the partial checkout on failure.
fn clone_fresh(repo_path: &NormalizedPath, url: &str, auth: &AuthMethod) -> Result<Repository> {
    if let Some(parent) = repo_path.parent() {
        std::fs::create_dir_all(parent.to_native())
            .map_err(|e| protodep_fs::Error::io(parent.to_native(), e))?;
    }

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options(auth));

    builder.clone(url, &repo_path.to_native()).map_err(|e| {
        if let Err(cleanup) = io::remove_dir_all_if_exists(repo_path) {
            tracing::warn!(path = %repo_path, error = %cleanup, "Failed to remove partial clone");
        }
        Error::CloneFailed {
            url: url.to_string(),
            message: e.message().to_string(),
        }
    })
}

/// Open a cached checkout and fetch all branches and tags from its origin.
fn fetch_existing(
    repo_path: &NormalizedPath,
    repository: &str,
    auth: &AuthMethod,
) -> Result<Repository> {
    let repo = Repository::open(repo_path.to_native()).map_err(|_| Error::CorruptCache {
        path: repo_path.to_native(),
    })?;

    {
        let mut remote = repo.find_remote(REMOTE)?;
        let mut options = fetch_options(auth);
        remote
            .fetch::<&str>(&[], Some(&mut options), None)
            .map_err(|e| Error::FetchFailed {
                repository: repository.to_string(),
                message: e.message().to_string(),
            })?;
    }

    Ok(repo)
}

/// Pick the commit to check out: the pinned revision, else the head of the
/// configured branch, else the head of the remote's default branch.
fn resolve_commit<'r>(
    repo: &'r Repository,
    dependency: &Dependency,
    repository: &str,
) -> Result<Commit<'r>> {
    if dependency.is_pinned() {
        return repo
            .revparse_single(&dependency.revision)
            .and_then(|object| object.peel_to_commit())
            .map_err(|_| Error::RevisionNotFound {
                repository: repository.to_string(),
                revision: dependency.revision.clone(),
            });
    }

    let branch = if dependency.branch.is_empty() {
        default_branch(repo)
    } else {
        dependency.branch.clone()
    };

    repo.find_reference(&format!("refs/remotes/{REMOTE}/{branch}"))
        .and_then(|reference| reference.peel_to_commit())
        .map_err(|_| Error::BranchNotFound {
            repository: repository.to_string(),
            branch,
        })
}

/// The branch `origin/HEAD` points at, or [`FALLBACK_BRANCH`].
fn default_branch(repo: &Repository) -> String {
    let prefix = format!("refs/remotes/{REMOTE}/");
    repo.find_reference(&format!("{prefix}HEAD"))
        .ok()
        .and_then(|head| head.symbolic_target().map(str::to_string))
        .and_then(|target| target.strip_prefix(&prefix).map(str::to_string))
        .unwrap_or_else(|| FALLBACK_BRANCH.to_string())
}
