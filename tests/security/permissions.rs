//! Permission normalization scenarios.

#![cfg(unix)]

use crate::Scenario;
use crate::test_utils::TarTestBuilder;
use crate::test_utils::ZipTestBuilder;
use safex_core::ExtractionConfig;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

fn mode_of(path: &Path) -> u32 {
    fs::symlink_metadata(path).unwrap().permissions().mode() & 0o7777
}

#[test]
fn test_setuid_root_shell_is_defanged() {
    let tar = TarTestBuilder::new()
        .add_file_with_mode("bin/rootshell", b"\x7fELF", 0o4755)
        .add_file_with_mode("bin/groupshell", b"\x7fELF", 0o2755)
        .add_file_with_mode("bin/everything", b"\x7fELF", 0o7777)
        .build();
    let scenario = Scenario::new("suid.tar.gz", &crate::test_utils::compress("gz", &tar));

    scenario.extract().unwrap();

    assert_eq!(mode_of(&scenario.out.join("bin/rootshell")), 0o755);
    assert_eq!(mode_of(&scenario.out.join("bin/groupshell")), 0o755);
    assert_eq!(mode_of(&scenario.out.join("bin/everything")), 0o777);
}

#[test]
fn test_zip_setuid_is_defanged() {
    let zip = ZipTestBuilder::new()
        .add_file_with_mode("tool", b"#!/bin/sh", 0o6755)
        .build();
    let scenario = Scenario::new("suid.zip", &zip);

    scenario.extract().unwrap();

    assert_eq!(mode_of(&scenario.out.join("tool")), 0o755);
}

#[test]
fn test_engine_created_directories_are_private() {
    let tar = TarTestBuilder::new().add_file("a/b/c/file", b"x").build();
    let scenario = Scenario::new("deep.tar", &tar);

    scenario.extract().unwrap();

    for dir in ["", "a", "a/b", "a/b/c"] {
        assert_eq!(mode_of(&scenario.out.join(dir)), 0o700, "{dir:?}");
    }
}

#[test]
fn test_root_entry_cannot_loosen_new_destination() {
    for root_entry in ["./", "."] {
        let tar = TarTestBuilder::new()
            .add_directory_with_mode(root_entry, 0o777)
            .add_file("inside.txt", b"x")
            .build();
        let scenario = Scenario::new("root.tar", &tar);

        let outcome = scenario.extract().unwrap();

        assert_eq!(mode_of(&scenario.out), 0o700, "{root_entry:?}");
        assert_eq!(outcome.members_written, 1, "{root_entry:?}");
        assert_eq!(mode_of(&scenario.out.join("inside.txt")), 0o644);
    }
}

#[test]
fn test_sticky_directory_member_loses_sticky_bit() {
    let tar = TarTestBuilder::new()
        .add_directory_with_mode("shared/", 0o1777)
        .add_file("shared/file", b"x")
        .build();
    let scenario = Scenario::new("sticky.tar", &tar);

    scenario.extract().unwrap();

    assert_eq!(mode_of(&scenario.out.join("shared")), 0o777);
}

#[test]
fn test_existing_destination_mode_is_left_alone() {
    let tar = TarTestBuilder::new().add_file("file", b"x").build();
    let scenario = Scenario::new("keep.tar", &tar);
    fs::create_dir(&scenario.out).unwrap();
    fs::set_permissions(&scenario.out, fs::Permissions::from_mode(0o755)).unwrap();

    scenario.extract().unwrap();

    assert_eq!(mode_of(&scenario.out), 0o755);
}

#[test]
fn test_custom_modes_from_config() {
    let tar = TarTestBuilder::new()
        .add_file_with_mode("sub/file", b"x", 0o4777)
        .build();
    let scenario = Scenario::new("config.tar", &tar);
    let config = ExtractionConfig {
        dir_mode: 0o750,
        default_file_mode: 0o640,
        preserve_permissions: false,
        ..Default::default()
    };

    scenario.extract_with(&config).unwrap();

    assert_eq!(mode_of(&scenario.out), 0o750);
    assert_eq!(mode_of(&scenario.out.join("sub")), 0o750);
    assert_eq!(mode_of(&scenario.out.join("sub/file")), 0o640);
}
