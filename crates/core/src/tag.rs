use crate::{AuthError, AuthResult};
use subtle::ConstantTimeEq;

/// CMAC-128 output length.
pub const MAC_LEN: usize = 16;
/// Authenticator length carried on the wire (24 bits).
pub const TRUNCATED_MAC_LEN: usize = 3;

/// Full 16-byte CMAC over one assembled record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullMac([u8; MAC_LEN]);

impl FullMac {
    pub const fn from_bytes(bytes: [u8; MAC_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; MAC_LEN] {
        &self.0
    }

    pub fn truncate(&self, n: usize) -> AuthResult<TruncatedMac> {
        truncate(self, n)
    }
}

/// Leading bytes of a [`FullMac`], or an expected authenticator received
/// out-of-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncatedMac {
    bytes: [u8; MAC_LEN],
    len: usize,
}

impl TruncatedMac {
    pub fn from_slice(bytes: &[u8]) -> AuthResult<Self> {
        if bytes.len() > MAC_LEN {
            return Err(AuthError::TruncationLengthInvalid {
                requested: bytes.len(),
                available: MAC_LEN,
            });
        }
        let mut out = [0u8; MAC_LEN];
        out[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            bytes: out,
            len: bytes.len(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Keep the first `n` bytes of `full`.
pub fn truncate(full: &FullMac, n: usize) -> AuthResult<TruncatedMac> {
    if n > MAC_LEN {
        return Err(AuthError::TruncationLengthInvalid {
            requested: n,
            available: MAC_LEN,
        });
    }
    TruncatedMac::from_slice(&full.as_bytes()[..n])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationResult {
    Match,
    Mismatch,
}

impl VerificationResult {
    pub fn is_match(self) -> bool {
        self == VerificationResult::Match
    }

    pub fn into_result(self) -> AuthResult<()> {
        match self {
            VerificationResult::Match => Ok(()),
            VerificationResult::Mismatch => Err(AuthError::VerificationMismatch),
        }
    }
}

/// Compare two authenticators in constant time. Different lengths never
/// match.
pub fn verify(computed: &TruncatedMac, expected: &TruncatedMac) -> VerificationResult {
    if bool::from(computed.as_bytes().ct_eq(expected.as_bytes())) {
        VerificationResult::Match
    } else {
        VerificationResult::Mismatch
    }
}
