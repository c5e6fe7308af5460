//! Tests for respack variant module

use respack::variant::list_candidates;
use respack::{Platform, PlatformRegistry, ResourceError, VariantResolver};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn touch(root: &Path, name: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, name).unwrap();
}

fn registry_platform(name: &str) -> Platform {
    PlatformRegistry::builtin().get(name).unwrap().clone()
}

#[test]
fn test_list_candidates_filters_base_and_extension() {
    let temp = TempDir::new().unwrap();
    for name in [
        "images/logo.png",
        "images/logo~color.png",
        "images/logo~bw.png",
        "images/logo~color.gif",
        "images/logos~color.png",
        "images/other~color.png",
    ] {
        touch(temp.path(), name);
    }

    let candidates = list_candidates(temp.path(), Path::new("images/logo.png")).unwrap();
    assert_eq!(candidates, ["logo~bw.png", "logo~color.png"]);
}

#[test]
fn test_resolve_picks_platform_variant() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "images/logo.png");
    touch(temp.path(), "images/logo~color.png");
    touch(temp.path(), "images/logo~bw.png");

    let resolver = VariantResolver::new(temp.path());
    let generic = Path::new("images/logo.png");

    assert_eq!(
        resolver.resolve(generic, &registry_platform("basalt")).unwrap(),
        PathBuf::from("images/logo~color.png")
    );
    assert_eq!(
        resolver.resolve(generic, &registry_platform("aplite")).unwrap(),
        PathBuf::from("images/logo~bw.png")
    );
}

#[test]
fn test_resolve_most_specific_wins() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "bg.png");
    touch(temp.path(), "bg~color.png");
    touch(temp.path(), "bg~color~round.png");

    let resolver = VariantResolver::new(temp.path());
    let generic = Path::new("bg.png");

    assert_eq!(
        resolver.resolve(generic, &registry_platform("chalk")).unwrap(),
        PathBuf::from("bg~color~round.png")
    );
    assert_eq!(
        resolver.resolve(generic, &registry_platform("basalt")).unwrap(),
        PathBuf::from("bg~color.png")
    );
}

#[test]
fn test_resolve_falls_back_to_generic() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "bg.png");
    touch(temp.path(), "bg~color.png");

    let resolver = VariantResolver::new(temp.path());
    assert_eq!(
        resolver
            .resolve(Path::new("bg.png"), &registry_platform("aplite"))
            .unwrap(),
        PathBuf::from("bg.png")
    );
}

#[test]
fn test_resolve_tie_is_an_error() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "a~red.png");
    touch(temp.path(), "a~blue.png");

    let resolver = VariantResolver::new(temp.path());
    let platform = Platform::new("p", &["red", "blue"]);

    match resolver.resolve(Path::new("a.png"), &platform).unwrap_err() {
        ResourceError::AmbiguousVariant {
            name,
            platform,
            score,
            candidates,
        } => {
            assert_eq!(name, "a.png");
            assert_eq!(platform, "p");
            assert_eq!(score, 1);
            assert_eq!(candidates, ["a~blue.png", "a~red.png"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_explicit_vocabulary() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "a~red.png");
    touch(temp.path(), "a~blue.png");

    let resolver = VariantResolver::new(temp.path());
    let platform = Platform::new("p", &["red"]);
    let vocab: BTreeSet<String> = ["red".to_string()].into();

    assert_eq!(
        resolver
            .resolve_with_vocabulary(Path::new("a.png"), &platform, &vocab)
            .unwrap(),
        PathBuf::from("a~red.png")
    );
}

#[test]
fn test_generic_name_with_separator_rejected() {
    let temp = TempDir::new().unwrap();
    let resolver = VariantResolver::new(temp.path());
    let err = resolver
        .resolve(Path::new("a~red.png"), &registry_platform("basalt"))
        .unwrap_err();
    assert!(matches!(err, ResourceError::InvalidName(_)));
}

#[test]
fn test_missing_directory_has_no_candidates() {
    let temp = TempDir::new().unwrap();
    let candidates = list_candidates(temp.path(), Path::new("nowhere/a.png")).unwrap();
    assert!(candidates.is_empty());
}

#[test]
fn test_separator_in_directory_is_allowed() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "~art/logo.png");
    touch(temp.path(), "~art/logo~color.png");

    let resolver = VariantResolver::new(temp.path());
    assert_eq!(
        resolver
            .resolve(Path::new("~art/logo.png"), &registry_platform("basalt"))
            .unwrap(),
        PathBuf::from("~art/logo~color.png")
    );
}
