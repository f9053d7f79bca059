#![cfg_attr(not(feature = "std"), no_std)]

pub mod backend;
pub mod echo;
pub mod engine;
pub mod hex;
pub mod key;
pub mod mac;
pub mod patterns;
pub mod record;
pub mod report;
pub mod selftest;
pub mod tag;


pub use backend::SoftwareCmac;
pub use engine::{Authenticator, Engine, Verdict};
pub use key::MacKey;
pub use mac::{compute_mac, CipherBackend, CipherId, CipherInfo, ContextState, MacContext};
pub use record::{assemble, AuthenticatedRecord, RecordField, RecordLayout};
pub use report::ReportSink;
pub use tag::{truncate, verify, FullMac, TruncatedMac, VerificationResult};

/// Stage-level debug tracing; compiled out of `no_std` builds.
macro_rules! stage_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "std")]
        tracing::debug!($($arg)*);
    };
}
pub(crate) use stage_debug;

/// One kind per authentication stage. Kinds are never merged: callers can
/// always tell where in the pipeline an attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{0} not supported")]
    AlgorithmUnsupported(CipherId),
    #[error("Cipher setup failed, ret={0}")]
    SetupFailed(i32),
    #[error("CMAC start failed, ret={0}")]
    KeyInitFailed(i32),
    #[error("CMAC update failed, ret={0}")]
    UpdateFailed(i32),
    #[error("CMAC finish failed, ret={0}")]
    FinalizeFailed(i32),
    #[error("MAC verification failed")]
    VerificationMismatch,
    #[error("Truncation to {requested} bytes exceeds the {available}-byte MAC")]
    TruncationLengthInvalid { requested: usize, available: usize },
    #[error("{field} is {actual} bytes, layout requires {expected}")]
    RecordLengthInvalid {
        field: RecordField,
        expected: usize,
        actual: usize,
    },
}

impl AuthError {
    /// Stable status code reported by the self-test entry point.
    /// Codes grow with stage order; `0` is reserved for a pass.
    pub const fn status_code(&self) -> i32 {
        match self {
            AuthError::AlgorithmUnsupported(_) => -1,
            AuthError::SetupFailed(_) => -2,
            AuthError::KeyInitFailed(_) => -3,
            AuthError::UpdateFailed(_) => -4,
            AuthError::FinalizeFailed(_) => -5,
            AuthError::VerificationMismatch => -6,
            AuthError::TruncationLengthInvalid { .. } => -7,
            AuthError::RecordLengthInvalid { .. } => -8,
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Map an authentication outcome to the self-test status code.
pub fn status_of<T>(result: &AuthResult<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => e.status_code(),
    }
}
