//! Loading `protodep.toml` / `protodep.lock` and deciding whether the lock
//! must be rewritten after a run.

use crate::schema::ProtoDep;
use crate::{Error, Result};
use protodep_fs::{NormalizedPath, io};

/// Manifest file name, relative to the project directory.
pub const MANIFEST_FILE: &str = "protodep.toml";

/// Lock file name, relative to the project directory.
pub const LOCK_FILE: &str = "protodep.lock";

/// Result of [`ManifestLoader::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedManifest {
    /// The effective manifest, with unpinned dependencies pinned to the lock
    pub config: ProtoDep,

    /// The lock must be written whatever the run resolves to
    pub needs_write: bool,

    /// The lock on disk when it was reconciled against the manifest
    pub previous_lock: Option<ProtoDep>,
}

impl LoadedManifest {
    /// Whether the lock assembled by a run must be persisted.
    ///
    /// A pinned tag or short hash only becomes comparable with the lock once
    /// it has been resolved, so a lock that differs from the reconciled one
    /// on disk is written too.
    pub fn must_write(&self, lock: &ProtoDep) -> bool {
        self.needs_write || self.previous_lock.as_ref().is_some_and(|previous| previous != lock)
    }
}

/// Loads the manifest of one project directory.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    target_dir: NormalizedPath,
    force_update: bool,
}

impl ManifestLoader {
    pub fn new(target_dir: NormalizedPath, force_update: bool) -> Self {
        Self {
            target_dir,
            force_update,
        }
    }

    pub fn manifest_path(&self) -> NormalizedPath {
        self.target_dir.join(MANIFEST_FILE)
    }

    pub fn lock_path(&self) -> NormalizedPath {
        self.target_dir.join(LOCK_FILE)
    }

    /// Load the effective manifest and whether the lock file must be written.
    ///
    /// With both files present, dependencies without a pinned revision inherit
    /// the revision recorded in the lock, so an unchanged project re-resolves
    /// to exactly the same commits.
    pub fn load(&self) -> Result<LoadedManifest> {
        let manifest_path = self.manifest_path();
        let lock_path = self.lock_path();

        let (config, stale, previous_lock) = match (manifest_path.is_file(), lock_path.is_file()) {
            (true, _) if self.force_update => (read_file(&manifest_path)?, true, None),
            (true, false) => (read_file(&manifest_path)?, true, None),
            (true, true) => {
                let manifest = read_file(&manifest_path)?;
                let lock = read_file(&lock_path)?;
                let (config, stale) = reconcile(manifest, &lock);
                (config, stale, Some(lock))
            }
            (false, true) => (read_file(&lock_path)?, self.force_update, None),
            (false, false) => {
                return Err(Error::ConfigNotFound {
                    dir: self.target_dir.to_native(),
                });
            }
        };

        let unpinned = config.dependencies.iter().any(|d| !d.is_pinned());
        let needs_write = stale || unpinned;

        tracing::debug!(
            dependencies = config.dependencies.len(),
            stale,
            unpinned,
            "Loaded manifest"
        );

        Ok(LoadedManifest {
            config,
            needs_write,
            previous_lock,
        })
    }

    /// Serialize the lock artifact and replace `protodep.lock` atomically.
    pub fn write_lock(&self, lock: &ProtoDep) -> Result<()> {
        let path = self.lock_path();
        let content = lock.to_toml().map_err(|e| Error::Serialize {
            path: path.to_native(),
            message: e.to_string(),
        })?;
        io::write_atomic(&path, content.as_bytes())?;
        tracing::info!(path = %path, "Wrote lock file");
        Ok(())
    }
}

fn read_file(path: &NormalizedPath) -> Result<ProtoDep> {
    let content = io::read_text(path)?;
    let config = ProtoDep::from_toml(&content).map_err(|e| Error::Parse {
        path: path.to_native(),
        message: e.to_string(),
    })?;
    config.validate().map_err(|message| Error::InvalidConfig {
        path: path.to_native(),
        message,
    })?;
    Ok(config)
}

/// Pin manifest dependencies to the lock and report whether the lock is stale.
///
/// Pinned revisions are not compared here: the lock holds resolved hashes.
fn reconcile(mut manifest: ProtoDep, lock: &ProtoDep) -> (ProtoDep, bool) {
    let mut stale = manifest.proto_outdir != lock.proto_outdir
        || manifest.patch_annotation != lock.patch_annotation
        || manifest.dependencies.len() != lock.dependencies.len();

    for dep in &mut manifest.dependencies {
        let Some(locked) = lock.dependencies.iter().find(|l| l.same_slot(dep)) else {
            stale = true;
            continue;
        };
        stale |= !locked.same_entry(dep);

        // a branch switch moves to the new branch head
        if !dep.is_pinned() && locked.branch == dep.branch {
            dep.revision = locked.revision.clone();
        }
    }

    let dropped = lock
        .dependencies
        .iter()
        .any(|l| !manifest.dependencies.iter().any(|d| d.same_slot(l)));

    (manifest, stale || dropped)
}
