//! Manifest and lock file schema
//!
//! ```toml
//! proto_outdir = "./proto"
//! patch_package_with_message_annotation = ".org.api.derived_from"
//!
//! [[dependencies]]
//! target = "github.com/protocolbuffers/protobuf/src"
//! branch = "main"
//! path = "google/protobuf"
//! ignores = ["./google/protobuf/test_", "**/unittest*.proto"]
//! protocol = "https"
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Number of `/`-separated tokens of a target that address the repository itself.
const REPOSITORY_TOKENS: usize = 3;

/// Contents of `protodep.toml` or `protodep.lock`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProtoDep {
    /// Output directory, relative to the project root.
    #[serde(default)]
    pub proto_outdir: String,

    /// Provenance annotation injected into every message. Empty disables patching.
    #[serde(
        rename = "patch_package_with_message_annotation",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub patch_annotation: String,

    /// Dependencies, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl ProtoDep {
    /// Parse TOML content.
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Build the lock artifact for this manifest from resolved dependencies.
    ///
    /// The resolved list is taken as-is; callers keep it in manifest order.
    pub fn locked(&self, resolved: Vec<ResolvedDependency>) -> ProtoDep {
        ProtoDep {
            proto_outdir: self.proto_outdir.clone(),
            patch_annotation: self.patch_annotation.clone(),
            dependencies: resolved
                .into_iter()
                .map(ResolvedDependency::into_locked)
                .collect(),
        }
    }

    /// Check structural constraints that serde cannot express.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (idx, dep) in self.dependencies.iter().enumerate() {
            if dep.target.trim().is_empty() {
                return Err(format!("dependencies[{idx}]: target is required"));
            }
        }
        Ok(())
    }
}

/// One `[[dependencies]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dependency {
    /// Repository plus optional sub-path, e.g. `github.com/org/repo/protos`.
    pub target: String,

    /// Pinned commit or tag.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub revision: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub branch: String,

    /// Destination sub-directory below `proto_outdir`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignores: Vec<String>,

    /// `ssh`, `https`, or empty for the default (ssh).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protocol: String,
}

impl Dependency {
    /// The addressable repository: the first three tokens of the target.
    pub fn repository(&self) -> String {
        let tokens: Vec<&str> = self.target.split('/').collect();
        if tokens.len() > REPOSITORY_TOKENS {
            tokens[..REPOSITORY_TOKENS].join("/")
        } else {
            self.target.clone()
        }
    }

    /// Sub-path of the target inside the repository, as `.` or `./sub/path`.
    pub fn directory(&self) -> String {
        let repository = self.repository();
        if self.target == repository {
            ".".to_string()
        } else {
            format!(".{}", &self.target[repository.len()..])
        }
    }

    /// Parsed transport protocol.
    pub fn protocol(&self) -> std::result::Result<Protocol, Error> {
        self.protocol.parse()
    }

    pub fn is_pinned(&self) -> bool {
        !self.revision.is_empty()
    }

    /// Whether two entries describe the same dependency slot.
    pub fn same_slot(&self, other: &Dependency) -> bool {
        self.target == other.target && self.path == other.path
    }

    /// Whether two entries are equal in every field except `revision`.
    pub fn same_entry(&self, other: &Dependency) -> bool {
        self.same_slot(other)
            && self.branch == other.branch
            && self.includes == other.includes
            && self.ignores == other.ignores
            && self.protocol == other.protocol
    }
}

/// A dependency together with the commit it was checked out at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub dependency: Dependency,
    pub hash: String,
}

impl ResolvedDependency {
    pub fn new(dependency: Dependency, hash: impl Into<String>) -> Self {
        Self {
            dependency,
            hash: hash.into(),
        }
    }

    /// The lock file entry: the declared dependency with `revision` set to the hash.
    pub fn into_locked(self) -> Dependency {
        Dependency {
            revision: self.hash,
            ..self.dependency
        }
    }
}

/// Transport used to reach a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    #[default]
    Ssh,
    Https,
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "" | "ssh" => Ok(Protocol::Ssh),
            "https" => Ok(Protocol::Https),
            _ => Err(Error::UnsupportedProtocol {
                protocol: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Ssh => write!(f, "ssh"),
            Protocol::Https => write!(f, "https"),
        }
    }
}
