//! Content fingerprints of intercepted host routines.
//!
//! Every intercepted routine carries the SHA-256 of the compiled body the
//! override logic was written against. At startup the registry hashes the
//! live bodies and reports drift. Nothing here is fatal: an unresolved
//! handle, an unreadable or empty body, or a mismatching digest is logged and
//! verification moves on to the next record.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use splice_types::{ContentDigest, DigestComparison, ExpectedDigest, RoutineName};
use thiserror::Error;

/// Access to the compiled instruction bytes behind a resolved routine handle.
pub trait RoutineBody {
    fn instruction_bytes(&self) -> io::Result<Vec<u8>>;
}

impl RoutineBody for Vec<u8> {
    fn instruction_bytes(&self) -> io::Result<Vec<u8>> {
        Ok(self.clone())
    }
}

impl RoutineBody for &'static [u8] {
    fn instruction_bytes(&self) -> io::Result<Vec<u8>> {
        Ok(self.to_vec())
    }
}

/// A routine body dumped to disk by the host.
#[derive(Debug, Clone)]
pub struct FileBody {
    path: PathBuf,
}

impl FileBody {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RoutineBody for FileBody {
    fn instruction_bytes(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

/// One host routine: a stable name plus its resolved handle, if resolution succeeded.
#[derive(Clone)]
pub struct TargetRoutine {
    name: RoutineName,
    handle: Option<Arc<dyn RoutineBody>>,
}

impl TargetRoutine {
    #[must_use]
    pub fn resolved(name: RoutineName, handle: Arc<dyn RoutineBody>) -> Self {
        Self {
            name,
            handle: Some(handle),
        }
    }

    #[must_use]
    pub fn unresolved(name: RoutineName) -> Self {
        Self { name, handle: None }
    }

    #[must_use]
    pub fn name(&self) -> &RoutineName {
        &self.name
    }

    #[must_use]
    pub fn handle(&self) -> Option<&dyn RoutineBody> {
        self.handle.as_deref()
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.handle.is_some()
    }
}

impl fmt::Debug for TargetRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetRoutine")
            .field("name", &self.name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct FingerprintRecord {
    pub target: TargetRoutine,
    pub expected: ExpectedDigest,
}

impl FingerprintRecord {
    #[must_use]
    pub fn new(target: TargetRoutine, expected: impl Into<ExpectedDigest>) -> Self {
        Self {
            target,
            expected: expected.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &RoutineName {
        self.target.name()
    }
}

/// SHA-256 of a routine body.
#[must_use]
pub fn fingerprint(body: &[u8]) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(body);
    ContentDigest::from_bytes(hasher.finalize().into())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unverifiable {
    /// The host could not resolve the routine.
    Unresolved,
    /// The body could not be read.
    Unreadable { reason: String },
    /// The body was read but has zero length.
    EmptyBody,
}

impl fmt::Display for Unverifiable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => f.write_str("routine handle is unresolved"),
            Self::Unreadable { reason } => write!(f, "body could not be read: {reason}"),
            Self::EmptyBody => f.write_str("body is empty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Match { actual: ContentDigest },
    /// No pin recorded; `actual` is informational.
    Unpinned { actual: ContentDigest },
    Mismatch {
        expected: String,
        actual: ContentDigest,
    },
    Unverifiable(Unverifiable),
}

#[derive(Debug, Clone)]
pub struct VerificationEntry {
    pub name: RoutineName,
    pub verification: Verification,
}

/// A mismatching record: the host implementation changed under the override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch<'a> {
    pub name: &'a RoutineName,
    pub expected: &'a str,
    pub actual: &'a ContentDigest,
}

/// Outcome of one verification pass, one entry per record in table order.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    entries: Vec<VerificationEntry>,
}

impl VerificationReport {
    #[must_use]
    pub fn entries(&self) -> &[VerificationEntry] {
        &self.entries
    }

    pub fn mismatches(&self) -> impl Iterator<Item = Mismatch<'_>> {
        self.entries.iter().filter_map(|entry| match &entry.verification {
            Verification::Mismatch { expected, actual } => Some(Mismatch {
                name: &entry.name,
                expected,
                actual,
            }),
            _ => None,
        })
    }

    pub fn unverifiable(&self) -> impl Iterator<Item = (&RoutineName, &Unverifiable)> {
        self.entries.iter().filter_map(|entry| match &entry.verification {
            Verification::Unverifiable(reason) => Some((&entry.name, reason)),
            _ => None,
        })
    }

    /// Actual digest of the first mismatching record, for one-line diagnostics.
    #[must_use]
    pub fn first_mismatch_digest(&self) -> Option<&ContentDigest> {
        self.mismatches().next().map(|mismatch| mismatch.actual)
    }

    #[must_use]
    pub fn has_mismatches(&self) -> bool {
        self.mismatches().next().is_some()
    }

    /// Every pinned record matched and every record could be hashed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|entry| {
            matches!(
                entry.verification,
                Verification::Match { .. } | Verification::Unpinned { .. }
            )
        })
    }
}

fn verify_record(record: &FingerprintRecord) -> Verification {
    let Some(handle) = record.target.handle() else {
        return Verification::Unverifiable(Unverifiable::Unresolved);
    };
    let body = match handle.instruction_bytes() {
        Ok(body) => body,
        Err(e) => {
            return Verification::Unverifiable(Unverifiable::Unreadable {
                reason: e.to_string(),
            });
        }
    };
    if body.is_empty() {
        return Verification::Unverifiable(Unverifiable::EmptyBody);
    }

    let actual = fingerprint(&body);
    match record.expected.compare(&actual.to_hex()) {
        DigestComparison::Match => Verification::Match { actual },
        DigestComparison::Unpinned => Verification::Unpinned { actual },
        DigestComparison::Mismatch => Verification::Mismatch {
            expected: record.expected.as_str().to_string(),
            actual,
        },
    }
}

/// Hash every record and compare against its pin.
///
/// Never stops early: each record is verified independently and the report
/// carries one entry per record.
#[must_use]
pub fn verify_all(records: &[FingerprintRecord]) -> VerificationReport {
    let entries = records
        .iter()
        .map(|record| {
            let verification = verify_record(record);
            log_verification(record.name(), &verification);
            VerificationEntry {
                name: record.name().clone(),
                verification,
            }
        })
        .collect();
    VerificationReport { entries }
}

fn log_verification(name: &RoutineName, verification: &Verification) {
    match verification {
        Verification::Match { .. } => {
            tracing::debug!(routine = %name, "Fingerprint check passed");
        }
        Verification::Unpinned { actual } => {
            tracing::info!(routine = %name, actual = %actual, "Fingerprint not pinned yet");
        }
        Verification::Mismatch { expected, actual } => {
            tracing::warn!(
                "Fingerprint mismatch: host code changed; override may need updating. \
                 Routine={name}, Expected={expected}, Actual={actual}"
            );
        }
        Verification::Unverifiable(reason) => {
            tracing::warn!("Fingerprint check skipped for {name}: {reason}");
        }
    }
}

#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("Duplicate fingerprint record: {name}")]
    DuplicateRecord { name: RoutineName },
}

/// The static table of target routines and their pinned digests.
#[derive(Debug, Clone, Default)]
pub struct FingerprintRegistry {
    records: Vec<FingerprintRecord>,
}

impl FingerprintRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, record: FingerprintRecord) -> Result<(), FingerprintError> {
        if self.lookup(record.name()).is_some() {
            return Err(FingerprintError::DuplicateRecord {
                name: record.name().clone(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    #[must_use]
    pub fn lookup(&self, name: &RoutineName) -> Option<&FingerprintRecord> {
        self.records.iter().find(|record| record.name() == name)
    }

    #[must_use]
    pub fn records(&self) -> &[FingerprintRecord] {
        &self.records
    }

    #[must_use]
    pub fn verify_all(&self) -> VerificationReport {
        verify_all(&self.records)
    }
}
