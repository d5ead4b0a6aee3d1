//! Hard link attack scenarios.

use crate::Scenario;
use crate::test_utils::TarTestBuilder;
use safex_core::ErrorKind;
use std::fs;
use std::path::Path;

#[test]
fn test_hardlink_target_outside_rejected() {
    for target in ["../../etc/passwd", "/etc/passwd", "a/../../secret"] {
        let tar = TarTestBuilder::new()
            .add_file("ok.txt", b"ok")
            .add_hardlink("link", target)
            .build();
        let scenario = Scenario::new("hard.tar", &tar);

        let err = scenario.extract().unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PathTraversal, "{target}");
        assert_eq!(err.path(), Some(Path::new("link")), "{target}");
        assert!(!scenario.out.exists(), "{target}");
    }
}

#[cfg(unix)]
#[test]
fn test_hardlink_through_existing_symlink_rejected() {
    let tar = TarTestBuilder::new()
        .add_hardlink("stolen", "ext/secret")
        .build();
    let scenario = Scenario::new("hard.tar", &tar);
    let outside = scenario.root().join("outside");
    fs::create_dir(&outside).unwrap();
    fs::write(outside.join("secret"), b"secret").unwrap();
    fs::create_dir(&scenario.out).unwrap();
    std::os::unix::fs::symlink(&outside, scenario.out.join("ext")).unwrap();

    let err = scenario.extract().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PathTraversal);
    assert!(!scenario.out.join("stolen").exists());
}

#[cfg(unix)]
#[test]
fn test_hardlink_inside_shares_inode() {
    use std::os::unix::fs::MetadataExt;

    let tar = TarTestBuilder::new()
        .add_file("dir/original", b"payload")
        .add_hardlink("copy", "dir/original")
        .build();
    let scenario = Scenario::new("hard.tar", &tar);

    let outcome = scenario.extract().unwrap();

    assert_eq!(outcome.hardlinks, 1);
    let original = fs::metadata(scenario.out.join("dir/original")).unwrap();
    let copy = fs::metadata(scenario.out.join("copy")).unwrap();
    assert_eq!(original.ino(), copy.ino());
    assert_eq!(original.nlink(), 2);
}

#[test]
fn test_hardlink_to_itself_rejected() {
    let tar = TarTestBuilder::new().add_hardlink("loop", "loop").build();
    let scenario = Scenario::new("loop.tar", &tar);

    let err = scenario.extract().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unexpected);
    assert!(!scenario.out.exists());
}

#[test]
fn test_hardlink_to_missing_member_fails_cleanly() {
    let tar = TarTestBuilder::new()
        .add_file("present.txt", b"here")
        .add_hardlink("link", "absent.txt")
        .build();
    let scenario = Scenario::new("missing.tar", &tar);

    let err = scenario.extract().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::IoFailure);
    assert!(!scenario.out.exists());
}
