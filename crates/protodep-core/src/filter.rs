//! Include/ignore matching for discovered proto files
//!
//! Every pattern is tried two ways and a path matches if either succeeds:
//!
//! - as a literal prefix, joined under the proto root
//! - as a glob over the full candidate path
//!
//! ```toml
//! ignores = ["vendor/", "**/*_test.proto"]
//! ```
//!
//! Here `vendor/` works as a prefix (`<root>/vendor...`) and
//! `**/*_test.proto` as a glob.

use glob::Pattern;
use protodep_fs::NormalizedPath;
use protodep_meta::Dependency;

use crate::{Error, Result};

/// A compiled list of include or ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    patterns: Vec<String>,
    globs: Vec<Pattern>,
}

impl PathFilter {
    /// Compile `patterns`. A malformed glob fails here, never at match time.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut raw = Vec::with_capacity(patterns.len());
        let mut globs = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Pattern::new(pattern).map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            raw.push(pattern.to_string());
            globs.push(glob);
        }

        Ok(Self {
            patterns: raw,
            globs,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `candidate` matches any pattern by prefix or by glob.
    pub fn matches(&self, root: &NormalizedPath, candidate: &NormalizedPath) -> bool {
        self.matches_prefix(root, candidate) || self.matches_glob(candidate)
    }

    /// Prefix rule: `candidate` starts with `root` joined with some pattern.
    pub fn matches_prefix(&self, root: &NormalizedPath, candidate: &NormalizedPath) -> bool {
        self.patterns
            .iter()
            .any(|pattern| candidate.starts_with_str(root.join(pattern).as_str()))
    }

    /// Glob rule: some compiled pattern accepts the whole candidate path.
    pub fn matches_glob(&self, candidate: &NormalizedPath) -> bool {
        self.globs.iter().any(|glob| glob.matches(candidate.as_str()))
    }
}

/// Compile `patterns` and test one candidate.
///
/// Convenience for one-off checks; the resolver compiles once per dependency.
pub fn matches<S: AsRef<str>>(
    root: &NormalizedPath,
    candidate: &NormalizedPath,
    patterns: &[S],
) -> Result<bool> {
    Ok(PathFilter::compile(patterns)?.matches(root, candidate))
}

/// Outcome of filtering one discovered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    /// Includes are configured and none matched
    NotIncluded,
    Ignored,
}

/// The include and ignore filters of one dependency.
#[derive(Debug, Clone, Default)]
pub struct DependencyFilter {
    includes: PathFilter,
    ignores: PathFilter,
}

impl DependencyFilter {
    pub fn new(includes: PathFilter, ignores: PathFilter) -> Self {
        Self { includes, ignores }
    }

    /// Compile the `includes` and `ignores` of `dependency`.
    pub fn for_dependency(dependency: &Dependency) -> Result<Self> {
        Ok(Self::new(
            PathFilter::compile(dependency.includes.as_slice())?,
            PathFilter::compile(dependency.ignores.as_slice())?,
        ))
    }

    pub fn decide(&self, root: &NormalizedPath, candidate: &NormalizedPath) -> Decision {
        if !self.includes.is_empty() && !self.includes.matches(root, candidate) {
            Decision::NotIncluded
        } else if self.ignores.matches(root, candidate) {
            Decision::Ignored
        } else {
            Decision::Keep
        }
    }

    /// Not ignored, and included when includes are configured.
    pub fn is_eligible(&self, root: &NormalizedPath, candidate: &NormalizedPath) -> bool {
        self.decide(root, candidate) == Decision::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> NormalizedPath {
        NormalizedPath::new("/cache/github.com/org/repo")
    }

    fn file(rel: &str) -> NormalizedPath {
        root().join(rel)
    }

    #[test]
    fn test_prefix_matches_below_joined_root() {
        let filter = PathFilter::compile(&["vendor/"]).unwrap();

        assert!(filter.matches_prefix(&root(), &file("vendor/a.proto")));
        assert!(!filter.matches_prefix(&root(), &file("pkg/vendor/a.proto")));
    }

    #[test]
    fn test_leading_slash_and_dot_are_relative_to_root() {
        let filter = PathFilter::compile(&["/google/protobuf", "./grpc"]).unwrap();

        assert!(filter.matches(&root(), &file("google/protobuf/empty.proto")));
        assert!(filter.matches(&root(), &file("grpc/health.proto")));
        assert!(!filter.matches(&root(), &file("other/empty.proto")));
    }

    #[test]
    fn test_glob_matches_full_path() {
        let filter = PathFilter::compile(&["**/*_test.proto"]).unwrap();

        assert!(filter.matches_glob(&file("pkg/foo_test.proto")));
        assert!(!filter.matches_glob(&file("pkg/foo.proto")));
    }

    #[test]
    fn test_invalid_glob_fails_at_compile_time() {
        let err = PathFilter::compile(&["protos/[unclosed"]).unwrap_err();

        assert!(matches!(err, Error::InvalidPattern { ref pattern, .. } if pattern == "protos/[unclosed"));
    }

    #[test]
    fn test_empty_filter_matches_nothing() {
        let filter = PathFilter::compile::<&str>(&[]).unwrap();

        assert!(filter.is_empty());
        assert!(!filter.matches(&root(), &file("a.proto")));
    }

    #[test]
    fn test_include_check_runs_before_ignore_check() {
        let filter = DependencyFilter::new(
            PathFilter::compile(&["api/"]).unwrap(),
            PathFilter::compile(&["api/internal/"]).unwrap(),
        );

        assert_eq!(filter.decide(&root(), &file("api/v1.proto")), Decision::Keep);
        assert_eq!(filter.decide(&root(), &file("api/internal/x.proto")), Decision::Ignored);
        assert_eq!(filter.decide(&root(), &file("web/v1.proto")), Decision::NotIncluded);
    }

    #[test]
    fn test_no_includes_keeps_everything_not_ignored() {
        let dep = Dependency {
            target: "github.com/org/repo".into(),
            ignores: vec!["vendor/".into()],
            ..Default::default()
        };
        let filter = DependencyFilter::for_dependency(&dep).unwrap();

        assert!(filter.is_eligible(&root(), &file("pkg/foo.proto")));
        assert!(!filter.is_eligible(&root(), &file("vendor/foo.proto")));
    }
}
