//! Fingerprint verification from a config file with routine body dumps.

use std::fs;
use std::path::{Path, PathBuf};

use splice_config::SpliceConfig;
use splice_core::{Unverifiable, Verification, fingerprint};
use splice_engine::PinTable;
use tempfile::tempdir;

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn matching_pin_is_case_insensitive() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("cost.il"), b"ldarg.1 ret").unwrap();
    let pin = fingerprint(b"ldarg.1 ret").to_hex().to_lowercase();
    let path = write_config(
        dir.path(),
        &format!(
            "[[fingerprints]]\nroutine = \"Host.Cost(int)\"\nbody = \"cost.il\"\nexpected = \"{pin}\"\n"
        ),
    );

    let config = SpliceConfig::load_from(&path).unwrap();
    let report = config.fingerprint_registry().unwrap().verify_all();

    assert_eq!(report.mismatches().count(), 0);
    assert!(report.is_clean());
}

#[test]
fn drifted_body_yields_one_mismatch_naming_the_routine() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("cost.il"), b"ldarg.1 ldc.i4.2 mul ret").unwrap();
    let path = write_config(
        dir.path(),
        "[[fingerprints]]\nroutine = \"Host.Cost(int)\"\nbody = \"cost.il\"\nexpected = \"XYZ999\"\n",
    );

    let config = SpliceConfig::load_from(&path).unwrap();
    let report = config.fingerprint_registry().unwrap().verify_all();

    let mismatches: Vec<_> = report.mismatches().collect();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].name.as_str(), "Host.Cost(int)");
    assert_eq!(mismatches[0].expected, "XYZ999");
    assert_eq!(
        report.first_mismatch_digest(),
        Some(&fingerprint(b"ldarg.1 ldc.i4.2 mul ret"))
    );
}

#[test]
fn unreadable_and_empty_bodies_are_unverifiable_not_mismatches() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("empty.il"), b"").unwrap();
    let path = write_config(
        dir.path(),
        r#"
[[fingerprints]]
routine = "Host.Empty()"
body = "empty.il"
expected = "ABC123"

[[fingerprints]]
routine = "Host.Missing()"
body = "missing.il"
expected = "ABC123"

[[fingerprints]]
routine = "Host.Unresolved()"
expected = "ABC123"
"#,
    );

    let config = SpliceConfig::load_from(&path).unwrap();
    let report = config.fingerprint_registry().unwrap().verify_all();

    assert!(!report.has_mismatches());
    let kinds: Vec<_> = report
        .entries()
        .iter()
        .map(|entry| match &entry.verification {
            Verification::Unverifiable(Unverifiable::EmptyBody) => "empty",
            Verification::Unverifiable(Unverifiable::Unreadable { .. }) => "unreadable",
            Verification::Unverifiable(Unverifiable::Unresolved) => "unresolved",
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(kinds, vec!["empty", "unreadable", "unresolved"]);
}

#[test]
fn builtin_pin_applies_to_known_routines() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("mc.il"), b"not the pinned body").unwrap();
    let path = write_config(
        dir.path(),
        "[[fingerprints]]\nroutine = \"FactionState.MissionControlCost(int)\"\nbody = \"mc.il\"\n",
    );

    let config = SpliceConfig::load_from(&path).unwrap();
    let pins = PinTable::builtin();
    let report = config
        .fingerprint_registry_with(|name| pins.expected(name.as_str()))
        .unwrap()
        .verify_all();

    let mismatches: Vec<_> = report.mismatches().collect();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(
        mismatches[0].expected,
        "A9B38584F8457697061D08116BFB03B113492B6A1C39AB1B950A21C13F425943"
    );
}
