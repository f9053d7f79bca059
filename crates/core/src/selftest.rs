//! One-shot CMAC self-test over a fixed SecOC-style vector.

use crate::backend::SoftwareCmac;
use crate::engine::{Authenticator, Engine, Verdict};
use crate::key::MacKey;
use crate::mac::CipherBackend;
use crate::record::{AuthenticatedRecord, RecordLayout};
use crate::report::ReportSink;
use crate::tag::{TruncatedMac, TRUNCATED_MAC_LEN};
use crate::{report, AuthResult};

pub const REFERENCE_KEY: MacKey = MacKey::new([
    0xFA, 0x7B, 0x0B, 0xCA, 0x18, 0x32, 0x95, 0xE4, 0xA3, 0x27, 0xB8, 0xC7, 0x2A, 0x1A, 0x4D, 0xFF,
]);
pub const REFERENCE_IDENTIFIER: [u8; 2] = [0x03, 0x09];
pub const REFERENCE_PAYLOAD: [u8; 12] = [0x00; 12];
pub const REFERENCE_FRESHNESS: [u8; 8] = [0x00; 8];
pub const REFERENCE_EXPECTED_MAC: [u8; TRUNCATED_MAC_LEN] = [0x6A, 0x0E, 0x6D];

/// Inputs for one self-test run.
#[derive(Debug, Clone)]
pub struct SelfTestVector<'a> {
    pub key: MacKey,
    pub identifier: &'a [u8],
    pub payload: &'a [u8],
    pub freshness: &'a [u8],
    pub expected_mac: &'a [u8],
    pub truncation_len: usize,
}

impl SelfTestVector<'static> {
    pub const fn reference() -> Self {
        Self {
            key: REFERENCE_KEY,
            identifier: &REFERENCE_IDENTIFIER,
            payload: &REFERENCE_PAYLOAD,
            freshness: &REFERENCE_FRESHNESS,
            expected_mac: &REFERENCE_EXPECTED_MAC,
            truncation_len: TRUNCATED_MAC_LEN,
        }
    }
}

impl SelfTestVector<'_> {
    /// Layout implied by the vector's own field lengths.
    pub fn layout(&self) -> RecordLayout {
        RecordLayout {
            identifier_len: self.identifier.len(),
            payload_len: self.payload.len(),
            freshness_len: self.freshness.len(),
        }
    }
}

/// Run `vector` through an engine built on `backend`.
pub fn run_vector<B, S>(backend: B, vector: &SelfTestVector<'_>, sink: &mut S) -> AuthResult<Authenticator>
where
    B: CipherBackend,
    S: ReportSink + ?Sized,
{
    evaluate_vector(backend, vector, sink).into_result()
}

/// Like [`run_vector`], but keeps the computed authenticator on a mismatch.
/// Vectors whose fields do not fit the record layout or the MAC are
/// reported to `sink` before any computation starts.
pub fn evaluate_vector<B, S>(backend: B, vector: &SelfTestVector<'_>, sink: &mut S) -> Verdict
where
    B: CipherBackend,
    S: ReportSink + ?Sized,
{
    let prepared = AuthenticatedRecord::new(
        vector.layout(),
        vector.identifier,
        vector.payload,
        vector.freshness,
    )
    .and_then(|record| Ok((record, TruncatedMac::from_slice(vector.expected_mac)?)));

    let verdict = match prepared {
        Ok((record, expected)) => Engine::new(backend)
            .with_truncation(vector.truncation_len)
            .evaluate(&vector.key, &record, &expected, sink),
        Err(err) => {
            report!(sink, "Error: {}", err);
            Verdict::Failed(err)
        }
    };
    stage_warn(&verdict);
    verdict
}

#[cfg(feature = "std")]
fn stage_warn(verdict: &Verdict) {
    let code = verdict.status_code();
    match verdict {
        Verdict::Pass(_) => {}
        Verdict::Mismatch(_) => {
            tracing::warn!(code, "CMAC self-test failed: {}", crate::AuthError::VerificationMismatch)
        }
        Verdict::Failed(err) => tracing::warn!(code, "CMAC self-test failed: {}", err),
    }
}

#[cfg(not(feature = "std"))]
fn stage_warn(_verdict: &Verdict) {}

/// Reference self-test with the software backend, reporting to `sink`.
/// Returns `0` on pass or the negative status code of the failing stage.
pub fn self_test_with<S: ReportSink + ?Sized>(sink: &mut S) -> i32 {
    evaluate_vector(SoftwareCmac, &SelfTestVector::reference(), sink).status_code()
}

/// Reference self-test reporting through `tracing`.
#[cfg(feature = "std")]
pub fn self_test() -> i32 {
    self_test_with(&mut crate::report::TracingSink)
}
