//! The interception core of Splice.
//!
//! - **`fingerprint`**: detect host routines whose compiled body drifted from
//!   the version the overrides were written against
//! - **`chain`**: compose override units around one host routine
//! - **`dirty`**: recompute per-entity cached values lazily after a
//!   configuration commit
//! - **`policy`**: the numeric rules override units share
//!
//! Everything runs on the host's single update thread. Nothing here blocks,
//! and nothing here locks.

pub mod chain;
pub mod dirty;
pub mod fingerprint;
pub mod policy;

pub use chain::{
    Before, Call, ChainError, Completion, InterceptionChain, OverrideUnit, Routine, UnitFault,
};
pub use dirty::DirtyRecompute;
pub use fingerprint::{
    FileBody, FingerprintError, FingerprintRecord, FingerprintRegistry, Mismatch, RoutineBody,
    TargetRoutine, Unverifiable, Verification, VerificationEntry, VerificationReport, fingerprint,
    verify_all,
};
