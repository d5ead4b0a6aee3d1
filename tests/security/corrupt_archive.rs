//! Damaged and mislabelled archives must fail before anything is written.

use crate::Scenario;
use crate::test_utils::compress;
use crate::test_utils::corrupt_first_zip_payload;
use crate::test_utils::create_test_tar;
use crate::test_utils::create_test_zip;
use safex_core::ErrorKind;

fn assert_rejected_untouched(scenario: &Scenario) {
    let err = scenario.extract().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptArchive, "{err}");
    assert!(err.is_security_violation());
    assert!(!scenario.out.exists(), "destination created for {err}");
}

#[test]
fn test_zip_crc_mismatch_rejected() {
    let mut zip = create_test_zip(vec![
        ("first.txt", b"first member payload".as_slice()),
        ("second.txt", b"second member payload".as_slice()),
    ]);
    corrupt_first_zip_payload(&mut zip, b"second member");

    assert_rejected_untouched(&Scenario::new("crc.zip", &zip));
}

#[test]
fn test_truncated_compressed_tar_rejected() {
    let tar = create_test_tar(vec![("big.bin", vec![7u8; 64 * 1024].as_slice())]);
    for suffix in ["gz", "bz2", "xz"] {
        let mut data = compress(suffix, &tar);
        data.truncate(data.len() / 2);

        assert_rejected_untouched(&Scenario::new(&format!("cut.tar.{suffix}"), &data));
    }
}

#[test]
fn test_compression_mislabelled_rejected() {
    let tar = create_test_tar(vec![("a.txt", b"alpha".as_slice())]);

    // xz data under a gzip name, gzip data under a bzip2 name.
    assert_rejected_untouched(&Scenario::new("wrong.tar.gz", &compress("xz", &tar)));
    assert_rejected_untouched(&Scenario::new("wrong.tar.bz2", &compress("gz", &tar)));
}

#[test]
fn test_zip_named_tar_rejected() {
    let zip = create_test_zip(vec![("a.txt", b"alpha".as_slice())]);

    assert_rejected_untouched(&Scenario::new("really-zip.tar.xz", &zip));
}

#[test]
fn test_garbage_zip_rejected() {
    assert_rejected_untouched(&Scenario::new("junk.zip", b"PK\x03\x04 not really a zip"));
}

#[test]
fn test_empty_file_rejected() {
    let scenario = Scenario::new("empty.tar", b"");

    let err = scenario.extract().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CorruptArchive);
    assert!(!scenario.out.exists());
}
