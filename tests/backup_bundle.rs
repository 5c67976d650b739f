#[path = "../src/backup.rs"]
mod backup;

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

const BLOB: &str = r#"{"cells":{"s1-math-W1":{"studentId":"s1","subjectId":"math","weekId":"W1","grades":[5,4]}},"currentWeek":"W1","currentTerm":"Q1-2023"}"#;

#[test]
fn zip_export_and_import_roundtrip() {
    let out_dir = temp_dir("gradebook-backup-out");
    let bundle_path = out_dir.join("state.gbk.zip");

    let export = backup::export_state_bundle(BLOB, &bundle_path).expect("export bundle");
    assert_eq!(export.bundle_format, backup::BUNDLE_FORMAT_V1);
    assert_eq!(export.entry_count, 2);
    assert_eq!(export.sha256.len(), 64);

    let f = File::open(&bundle_path).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest entry")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    assert!(manifest.contains(backup::BUNDLE_FORMAT_V1));
    assert!(manifest.contains(&export.sha256));

    let imported = backup::import_state_bundle(&bundle_path).expect("import bundle");
    assert_eq!(imported.bundle_format_detected, backup::BUNDLE_FORMAT_V1);
    assert_eq!(imported.blob, BLOB);

    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn tampered_state_entry_is_rejected() {
    let out_dir = temp_dir("gradebook-backup-tamper");
    let good = out_dir.join("good.zip");
    let export = backup::export_state_bundle(BLOB, &good).expect("export bundle");

    // Rebuild the bundle with the original manifest but a different state entry.
    let mut manifest = String::new();
    zip::ZipArchive::new(File::open(&good).expect("open"))
        .expect("archive")
        .by_name("manifest.json")
        .expect("manifest")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    assert!(manifest.contains(&export.sha256));

    let bad = out_dir.join("bad.zip");
    let mut zip = zip::ZipWriter::new(File::create(&bad).expect("create bad"));
    let opts = zip::write::FileOptions::default();
    zip.start_file("manifest.json", opts).expect("start manifest");
    zip.write_all(manifest.as_bytes()).expect("write manifest");
    zip.start_file("state/gradebook.json", opts).expect("start state");
    zip.write_all(br#"{"cells":{},"currentWeek":"W1","currentTerm":"Q1-2023"}"#)
        .expect("write state");
    zip.finish().expect("finish");

    let e = backup::import_state_bundle(&bad).expect_err("tampered bundle must fail");
    assert!(e.to_string().contains("checksum"));

    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn plain_json_import_is_supported() {
    let out_dir = temp_dir("gradebook-backup-plain");
    let legacy_file = out_dir.join("gameState.json");
    let listed = r#"{"cells":[{"studentId":"s1","subjectId":"math","weekId":"W1","grades":[5]}]}"#;
    std::fs::write(&legacy_file, listed).expect("write plain json");

    let imported = backup::import_state_bundle(&legacy_file).expect("import plain json");
    assert_eq!(imported.bundle_format_detected, backup::PLAIN_JSON_FORMAT);
    assert_eq!(imported.blob, listed);

    let _ = std::fs::remove_dir_all(out_dir);
}
