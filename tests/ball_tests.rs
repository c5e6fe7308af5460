//! Tests for respack ball module (aggregation)

use respack::{
    Aggregator, GeneratorRegistry, PlatformRegistry, ResourceBall, ResourceDeclaration,
    ResourceDefinition, ResourceError, StorageClass, TargetPlatforms,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, name: &str, content: &[u8]) {
    fs::write(root.join(name), content).unwrap();
}

fn definitions() -> Vec<ResourceDefinition> {
    vec![
        ResourceDefinition::new("raw", "FIRST", "first.bin"),
        ResourceDefinition::new("raw", "COLOR_ONLY", "color.bin")
            .with_platforms(TargetPlatforms::only(["basalt", "chalk"])),
        ResourceDefinition::new("raw", "SECOND", "second.bin")
            .with_storage(StorageClass::LinkEmbedded)
            .with_alias("SECOND_ALIAS"),
    ]
}

fn fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "first.bin", b"first");
    write(temp.path(), "first~color.bin", b"first in color");
    write(temp.path(), "color.bin", b"color");
    write(temp.path(), "second.bin", b"second");
    temp
}

#[test]
fn test_build_skips_untargeted_definitions() {
    let temp = fixture();
    let platforms = PlatformRegistry::builtin();
    let registry = GeneratorRegistry::with_defaults();

    let aplite = Aggregator::new(platforms.get("aplite").unwrap(), &registry, temp.path());
    let ball = aplite
        .build(&definitions(), &[ResourceDeclaration::new("raw", "LANG")])
        .unwrap();

    let names: Vec<_> = ball.resource_objects.iter().map(|o| o.name()).collect();
    assert_eq!(names, ["FIRST", "SECOND"]);
    assert_eq!(ball.resource_objects[0].data(), b"first");
    assert_eq!(ball.id_of("LANG"), Some(3));

    let basalt = Aggregator::new(platforms.get("basalt").unwrap(), &registry, temp.path());
    let ball = basalt.build(&definitions(), &[]).unwrap();

    let names: Vec<_> = ball.resource_objects.iter().map(|o| o.name()).collect();
    assert_eq!(names, ["FIRST", "COLOR_ONLY", "SECOND"]);
    assert_eq!(ball.resource_objects[0].data(), b"first in color");
}

#[test]
fn test_ids_are_stable_across_runs() {
    let temp = fixture();
    let platforms = PlatformRegistry::builtin();
    let registry = GeneratorRegistry::with_defaults();
    let platform = platforms.get("chalk").unwrap();

    let run = || {
        Aggregator::new(platform, &registry, temp.path())
            .build(&definitions(), &[ResourceDeclaration::new("raw", "LANG")])
            .unwrap()
    };
    let first = run();
    let second = run();

    assert_eq!(first.resource_ids(), second.resource_ids());
    assert_eq!(first.content_hash(), second.content_hash());
    assert_eq!(first.id_of("SECOND_ALIAS"), first.id_of("SECOND"));
}

#[test]
fn test_failures_fail_the_variant_and_name_each_resource() {
    let temp = fixture();
    let platforms = PlatformRegistry::builtin();
    let registry = GeneratorRegistry::with_defaults();
    let aggregator = Aggregator::new(platforms.get("diorite").unwrap(), &registry, temp.path());

    let mut defs = definitions();
    defs.push(ResourceDefinition::new("raw", "GONE", "gone.bin"));
    defs.push(ResourceDefinition::new("font", "FONT", "first.bin"));

    match aggregator.build(&defs, &[]).unwrap_err() {
        ResourceError::MissingResources { failures } => {
            assert_eq!(failures.len(), 2);
            assert!(failures[0].starts_with("GONE:"));
            assert!(failures[1].starts_with("FONT:"));
        }
        other => panic!("unexpected error: {other}"),
    }

    // siblings still generate on their own
    assert!(aggregator.generate_one(&defs[0]).is_ok());
}

#[test]
fn test_save_and_load_roundtrip() {
    let temp = fixture();
    let platforms = PlatformRegistry::builtin();
    let registry = GeneratorRegistry::with_defaults();
    let ball = Aggregator::new(platforms.get("chalk").unwrap(), &registry, temp.path())
        .build(&definitions(), &[ResourceDeclaration::new("raw", "LANG")])
        .unwrap();
    assert_eq!(ball.resource_objects[1].name(), "COLOR_ONLY");

    let path = temp.path().join("build/ball.json");
    ball.save(&path).unwrap();
    let loaded = ResourceBall::load(&path).unwrap();

    assert_eq!(loaded, ball);
    assert_eq!(
        loaded.resource_objects[1].definition.target_platforms,
        TargetPlatforms::only(["basalt", "chalk"])
    );
}

#[test]
fn test_declarations_follow_objects() {
    let temp = fixture();
    let platforms = PlatformRegistry::builtin();
    let registry = GeneratorRegistry::with_defaults();
    let ball = Aggregator::new(platforms.get("aplite").unwrap(), &registry, temp.path())
        .build(&definitions(), &[ResourceDeclaration::new("raw", "LANG")])
        .unwrap();

    let names: Vec<_> = ball.declarations().into_iter().map(|d| d.name).collect();
    assert_eq!(names, ["FIRST", "SECOND", "LANG"]);
}

#[test]
fn test_variants_limited_to_platform_tags() {
    let temp = fixture();
    write(temp.path(), "art.bin", b"art");
    write(temp.path(), "art~round.bin", b"round art");
    write(temp.path(), "art~color.bin", b"color art");
    write(temp.path(), "art~color~round.bin", b"color round art");

    let platforms = PlatformRegistry::builtin();
    let registry = GeneratorRegistry::with_defaults();
    let def = ResourceDefinition::new("raw", "ART", "art.bin");

    let data = |platform: &str| {
        let objects = Aggregator::new(platforms.get(platform).unwrap(), &registry, temp.path())
            .generate_one(&def)
            .unwrap();
        objects[0].data().to_vec()
    };

    assert_eq!(data("aplite"), b"art");
    assert_eq!(data("basalt"), b"color art");
    assert_eq!(data("chalk"), b"color round art");
}
