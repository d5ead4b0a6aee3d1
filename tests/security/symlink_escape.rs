//! Symlink escape scenarios, both from archive members and from links
//! already present in the destination.

use crate::Scenario;
use crate::test_utils::TarTestBuilder;
use crate::test_utils::ZipTestBuilder;
use safex_core::ErrorKind;
use safex_core::ExtractionConfig;
use std::fs;
use std::path::Path;

#[test]
fn test_symlink_target_escape_rejected() {
    for target in ["../../etc/passwd", "../outside", "a/../../.."] {
        let tar = TarTestBuilder::new()
            .add_file("file.txt", b"x")
            .add_symlink("link", target)
            .build();
        let scenario = Scenario::new("escape.tar", &tar);

        let err = scenario.extract().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PathTraversal, "{target}");
        assert_eq!(err.path(), Some(Path::new("link")), "{target}");
        assert!(!scenario.out.exists(), "{target}");
    }
}

#[test]
fn test_absolute_symlink_target_rejected() {
    let tar = TarTestBuilder::new().add_symlink("passwd", "/etc/passwd").build();
    let scenario = Scenario::new("abs.tar", &tar);

    let err = scenario.extract().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PathTraversal);
}

#[test]
fn test_nested_link_target_resolves_from_its_parent() {
    // One level up from a/b is a, still inside; two more levels is not.
    let inside = TarTestBuilder::new()
        .add_file("a/target.txt", b"t")
        .add_symlink("a/b/link", "../target.txt")
        .build();
    Scenario::new("inside.tar", &inside).extract().unwrap();

    let outside = TarTestBuilder::new()
        .add_symlink("a/b/link", "../../../target.txt")
        .build();
    let err = Scenario::new("outside.tar", &outside).extract().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PathTraversal);
}

#[test]
#[cfg(unix)]
fn test_symlink_through_aliased_parent_rejected() {
    // `d` is the root itself, so `d/l -> ../secret.txt` lands beside `out`.
    let tar = TarTestBuilder::new()
        .add_symlink("d", ".")
        .add_symlink("d/l", "../secret.txt")
        .build();
    let scenario = Scenario::new("alias.tar", &tar);
    fs::write(scenario.root().join("secret.txt"), b"outside").unwrap();

    let err = scenario.extract().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PathTraversal);
    assert_eq!(err.path(), Some(Path::new("d/l")));
    assert!(!scenario.out.exists());
}

#[test]
fn test_zip_symlink_escape_rejected() {
    let zip = ZipTestBuilder::new()
        .add_symlink("evil", "../../../../etc/shadow")
        .build();
    let scenario = Scenario::new("escape.zip", &zip);

    let err = scenario.extract().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PathTraversal);
    assert!(!scenario.out.exists());
}

#[test]
fn test_symlinks_disallowed_by_config() {
    let tar = TarTestBuilder::new()
        .add_file("target.txt", b"t")
        .add_symlink("link", "target.txt")
        .build();
    let scenario = Scenario::new("links.tar", &tar);
    let config = ExtractionConfig {
        allow_symlinks: false,
        ..Default::default()
    };

    let err = scenario.extract_with(&config).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PathTraversal);
    assert!(!scenario.out.exists());
}

#[cfg(unix)]
#[test]
fn test_write_through_internal_symlink_stays_inside() {
    let tar = TarTestBuilder::new()
        .add_directory("data/")
        .add_symlink("alias", "data")
        .add_file("alias/file.txt", b"through")
        .build();
    let scenario = Scenario::new("alias.tar", &tar);

    scenario.extract().unwrap();

    assert_eq!(fs::read(scenario.out.join("data/file.txt")).unwrap(), b"through");
}

#[cfg(unix)]
#[test]
fn test_existing_symlink_to_outside_is_not_followed() {
    let tar = TarTestBuilder::new()
        .add_file("escape/pwned.txt", b"pwned")
        .build();
    let scenario = Scenario::new("existing.tar", &tar);
    let outside = scenario.root().join("outside");
    fs::create_dir(&outside).unwrap();
    fs::create_dir(&scenario.out).unwrap();
    std::os::unix::fs::symlink(&outside, scenario.out.join("escape")).unwrap();

    let err = scenario.extract().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PathTraversal);
    assert!(!outside.join("pwned.txt").exists());
    // The destination existed beforehand, so it survives the cleanup.
    assert!(fs::symlink_metadata(scenario.out.join("escape")).is_ok());
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_on_path_is_an_escape() {
    let tar = TarTestBuilder::new().add_file("dangling/x", b"x").build();
    let scenario = Scenario::new("dangling.tar", &tar);
    fs::create_dir(&scenario.out).unwrap();
    std::os::unix::fs::symlink(
        scenario.root().join("not-there"),
        scenario.out.join("dangling"),
    )
    .unwrap();

    let err = scenario.extract().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PathTraversal);
    assert!(!scenario.root().join("not-there").exists());
}

#[cfg(unix)]
#[test]
fn test_symlink_at_final_component_is_replaced() {
    let tar = TarTestBuilder::new().add_file("victim.txt", b"new").build();
    let scenario = Scenario::new("replace.tar", &tar);
    let victim = scenario.root().join("victim-outside.txt");
    fs::write(&victim, b"original").unwrap();
    fs::create_dir(&scenario.out).unwrap();
    std::os::unix::fs::symlink(&victim, scenario.out.join("victim.txt")).unwrap();

    scenario.extract().unwrap();

    assert_eq!(fs::read(&victim).unwrap(), b"original");
    let meta = fs::symlink_metadata(scenario.out.join("victim.txt")).unwrap();
    assert!(meta.file_type().is_file());
    assert_eq!(fs::read(scenario.out.join("victim.txt")).unwrap(), b"new");
}
