//! Tests for include/ignore matching

use proptest::prelude::*;
use protodep_core::filter::{self, Decision, DependencyFilter, PathFilter};
use protodep_fs::NormalizedPath;
use protodep_meta::Dependency;
use rstest::rstest;

const ROOT: &str = "/home/dev/.protodep/github.com/org/repo";

fn candidate(relative: &str) -> NormalizedPath {
    NormalizedPath::new(ROOT).join(relative)
}

#[rstest]
#[case("vendor/a.proto", false)]
#[case("pkg/foo_test.proto", false)]
#[case("pkg/foo.proto", true)]
fn test_prefix_and_glob_ignores(#[case] relative: &str, #[case] kept: bool) {
    let dep = Dependency {
        target: "github.com/org/repo".into(),
        ignores: vec!["vendor/".into(), "**/*_test.proto".into()],
        ..Default::default()
    };
    let filter = DependencyFilter::for_dependency(&dep).unwrap();

    assert_eq!(
        filter.is_eligible(&NormalizedPath::new(ROOT), &candidate(relative)),
        kept
    );
}

#[test]
fn test_legacy_prefix_without_trailing_separator() {
    let dep = Dependency {
        target: "github.com/protocolbuffers/protobuf/src".into(),
        ignores: vec!["./google/protobuf/test_".into()],
        ..Default::default()
    };
    let filter = DependencyFilter::for_dependency(&dep).unwrap();
    let root = NormalizedPath::new(ROOT);

    assert_eq!(
        filter.decide(&root, &candidate("google/protobuf/test_messages.proto")),
        Decision::Ignored
    );
    assert_eq!(
        filter.decide(&root, &candidate("google/protobuf/empty.proto")),
        Decision::Keep
    );
}

#[test]
fn test_includes_restrict_to_matching_files() {
    let dep = Dependency {
        target: "github.com/org/repo".into(),
        includes: vec!["/api".into(), "**/shared.proto".into()],
        ..Default::default()
    };
    let filter = DependencyFilter::for_dependency(&dep).unwrap();
    let root = NormalizedPath::new(ROOT);

    assert_eq!(filter.decide(&root, &candidate("api/v1/user.proto")), Decision::Keep);
    assert_eq!(filter.decide(&root, &candidate("lib/shared.proto")), Decision::Keep);
    assert_eq!(
        filter.decide(&root, &candidate("lib/other.proto")),
        Decision::NotIncluded
    );
}

#[test]
fn test_malformed_ignore_is_rejected_for_dependency() {
    let dep = Dependency {
        target: "github.com/org/repo".into(),
        ignores: vec!["[".into()],
        ..Default::default()
    };

    let err = DependencyFilter::for_dependency(&dep).unwrap_err();

    assert!(err.to_string().contains("Invalid pattern '['"), "got: {err}");
    assert_eq!(err.kind(), protodep_core::ErrorKind::Configuration);
}

#[test]
fn test_one_off_matches() {
    let root = NormalizedPath::new(ROOT);

    assert!(filter::matches(&root, &candidate("vendor/x.proto"), &["vendor"]).unwrap());
    assert!(!filter::matches(&root, &candidate("src/x.proto"), &["vendor"]).unwrap());
}

proptest! {
    #[test]
    fn prop_match_is_prefix_or_glob(
        relative in "[a-c]{1,3}(/[a-c]{1,3}){0,3}\\.proto",
        prefix in "[a-c]{1,3}",
        glob in "\\*\\*/[a-c]\\*\\.proto",
    ) {
        let root = NormalizedPath::new(ROOT);
        let path = candidate(&relative);
        let patterns = [prefix.clone(), glob.clone()];
        let combined = PathFilter::compile(&patterns).unwrap();

        let prefix_only = PathFilter::compile(&[prefix]).unwrap();
        let glob_only = PathFilter::compile(&[glob]).unwrap();

        let expected = prefix_only.matches(&root, &path) || glob_only.matches(&root, &path);
        prop_assert_eq!(combined.matches(&root, &path), expected);
        prop_assert_eq!(
            combined.matches(&root, &path),
            combined.matches_prefix(&root, &path) || combined.matches_glob(&path)
        );
    }
}
