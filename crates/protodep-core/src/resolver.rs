//! The resolution run: load, fetch, filter, patch, write, lock

use std::path::Path;

use protodep_fs::{NormalizedPath, io};
use protodep_git::{AuthMethod, GitSource, RepositorySource};
use protodep_meta::{Dependency, ManifestLoader, ProtoDep, Protocol, ResolvedDependency};
use walkdir::WalkDir;

use crate::filter::{Decision, DependencyFilter};
use crate::patch::ProtoPatcher;
use crate::{Error, Result};

/// Cache directory name below the home directory.
pub const CACHE_DIR: &str = ".protodep";

const PROTO_EXTENSION: &str = "proto";

/// Settings for one resolution run.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Holds the `.protodep` cache and `.ssh` identities
    pub home_dir: NormalizedPath,

    /// Directory containing `protodep.toml` / `protodep.lock`
    pub target_dir: NormalizedPath,

    /// Parent of the manifest's `proto_outdir`
    pub output_dir: NormalizedPath,

    /// Use HTTPS for every dependency regardless of its `protocol`
    pub use_https: bool,

    pub basic_auth_username: String,
    pub basic_auth_password: String,

    /// Key file name below `<home_dir>/.ssh`
    pub identity_file: String,
    pub identity_password: String,
}

impl ResolverConfig {
    pub fn new(
        home_dir: impl Into<NormalizedPath>,
        target_dir: impl Into<NormalizedPath>,
        output_dir: impl Into<NormalizedPath>,
    ) -> Self {
        Self {
            home_dir: home_dir.into(),
            target_dir: target_dir.into(),
            output_dir: output_dir.into(),
            use_https: false,
            basic_auth_username: String::new(),
            basic_auth_password: String::new(),
            identity_file: String::new(),
            identity_password: String::new(),
        }
    }

    pub fn cache_dir(&self) -> NormalizedPath {
        self.home_dir.join(CACHE_DIR)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The lock artifact, in manifest order
    pub lock: ProtoDep,

    /// Whether `protodep.lock` was written
    pub lock_written: bool,

    pub files_written: usize,
}

/// A discovered `.proto` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoResource {
    pub source: NormalizedPath,

    /// Path below the proto root, e.g. `google/protobuf/empty.proto`
    pub relative: String,
}

/// Runs the pipeline against a [`RepositorySource`].
pub struct Resolver<S = GitSource> {
    config: ResolverConfig,
    source: S,
    https: AuthMethod,
    ssh: AuthMethod,
}

impl Resolver<GitSource> {
    /// Resolver backed by the git cache.
    pub fn new(config: ResolverConfig) -> Result<Self> {
        Self::with_source(config, GitSource::new())
    }
}

impl<S: RepositorySource> Resolver<S> {
    /// Build the auth strategies once; they are shared by every dependency.
    pub fn with_source(config: ResolverConfig, source: S) -> Result<Self> {
        let https = AuthMethod::https(&config.basic_auth_username, &config.basic_auth_password);
        let ssh = AuthMethod::ssh(
            &config.home_dir,
            &config.identity_file,
            &config.identity_password,
        )?;

        Ok(Self {
            config,
            source,
            https,
            ssh,
        })
    }

    /// Resolve every dependency of the manifest in `target_dir`.
    ///
    /// The output tree is rebuilt from scratch. The first error aborts the
    /// run; files already written stay in place.
    pub fn resolve(&self, force_update: bool, cleanup_cache: bool) -> Result<Resolution> {
        let loader = ManifestLoader::new(self.config.target_dir.clone(), force_update);
        let loaded = loader.load()?;
        let manifest = &loaded.config;

        let cache_dir = self.config.cache_dir();
        if cleanup_cache && cache_dir.is_dir() {
            let removed = io::remove_child_dirs(&cache_dir)?;
            tracing::info!(path = %cache_dir, removed, "Cleaned dependency cache");
        }

        let output_root = self.output_root(manifest)?;
        io::remove_dir_all_if_exists(&output_root)?;

        let patcher = ProtoPatcher::new(
            &manifest.patch_annotation,
            &manifest.dependencies,
            &manifest.proto_outdir,
        );

        let mut resolved = Vec::with_capacity(manifest.dependencies.len());
        let mut files_written = 0;

        for dependency in &manifest.dependencies {
            let auth = self.auth_for(dependency)?;
            let filter = DependencyFilter::for_dependency(dependency)?;

            let opened = self.source.open(&cache_dir, dependency, auth)?;
            let root = opened.proto_root_dir();
            if !root.is_dir() {
                return Err(Error::ProtoRootNotFound {
                    repository: dependency.repository(),
                    path: root.to_native(),
                });
            }

            let resources = collect_resources(root, &filter)?;
            for resource in &resources {
                write_resource(&output_root, dependency, resource, &patcher)?;
            }

            tracing::info!(
                dependency = %dependency.target,
                hash = %opened.hash,
                files = resources.len(),
                "Resolved dependency"
            );

            files_written += resources.len();
            resolved.push(ResolvedDependency::new(dependency.clone(), opened.hash));
        }

        let lock = manifest.locked(resolved);
        let lock_written = loaded.must_write(&lock);
        if lock_written {
            loader.write_lock(&lock)?;
        }

        Ok(Resolution {
            lock,
            lock_written,
            files_written,
        })
    }

    fn auth_for(&self, dependency: &Dependency) -> Result<&AuthMethod> {
        if self.config.use_https {
            return Ok(&self.https);
        }
        Ok(match dependency.protocol()? {
            Protocol::Https => &self.https,
            Protocol::Ssh => &self.ssh,
        })
    }

    /// `output_dir/proto_outdir`, which must be strictly below `output_dir`
    /// since it is deleted on every run.
    fn output_root(&self, manifest: &ProtoDep) -> Result<NormalizedPath> {
        let output_dir = self.config.output_dir.cleaned();
        let output_root = output_dir.join(&manifest.proto_outdir);

        match output_root.relative_to(&output_dir) {
            Some(relative) if !relative.is_empty() => Ok(output_root),
            _ => Err(Error::InvalidOutputDir {
                proto_outdir: manifest.proto_outdir.clone(),
            }),
        }
    }
}

/// Walk `root` in file-name order and keep the `.proto` files `filter` accepts.
pub fn collect_resources(
    root: &NormalizedPath,
    filter: &DependencyFilter,
) -> Result<Vec<ProtoResource>> {
    let mut resources = Vec::new();

    let walker = WalkDir::new(root.to_native())
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|source| Error::Walk {
            path: root.to_native(),
            source,
        })?;
        // `path().is_file()` follows symlinked files, which the walker reports as links
        if !entry.path().is_file() || !is_proto(entry.path()) {
            continue;
        }

        let candidate = NormalizedPath::new(entry.path());
        match filter.decide(root, &candidate) {
            Decision::NotIncluded => {
                tracing::info!(path = %candidate, "Skipped due to include setting");
                continue;
            }
            Decision::Ignored => {
                tracing::info!(path = %candidate, "Skipped due to ignore setting");
                continue;
            }
            Decision::Keep => {}
        }

        if let Some(relative) = candidate.relative_to(root) {
            resources.push(ProtoResource {
                relative: relative.to_string(),
                source: candidate.clone(),
            });
        }
    }

    Ok(resources)
}

fn is_proto(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == PROTO_EXTENSION)
}

/// Destination below the output root: `dependency.path` joined with `relative`.
fn destination(dependency_path: &str, relative: &str) -> String {
    NormalizedPath::new(dependency_path)
        .join(relative)
        .segments()
        .collect::<Vec<_>>()
        .join("/")
}

fn write_resource(
    output_root: &NormalizedPath,
    dependency: &Dependency,
    resource: &ProtoResource,
    patcher: &ProtoPatcher<'_>,
) -> Result<()> {
    let content = io::read_bytes(&resource.source)?;
    let destination = destination(&dependency.path, &resource.relative);
    let content = patcher.patch(&content, &destination);

    let path = output_root.join(&destination);
    io::write_with_directory(&path, &content)?;
    tracing::debug!(from = %resource.source, to = %path, "Wrote proto");
    Ok(())
}
