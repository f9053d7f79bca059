use crate::hex::{self, Delimiter, HexString};
use crate::key::MacKey;
use crate::mac::{compute_mac, CipherBackend};
use crate::record::AuthenticatedRecord;
use crate::report::ReportSink;
use crate::tag::{verify, FullMac, TruncatedMac, MAC_LEN, TRUNCATED_MAC_LEN};
use crate::{report, stage_debug, AuthError, AuthResult};

/// Result of a successful computation: the full CMAC and the authenticator
/// derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticator {
    pub full: FullMac,
    pub truncated: TruncatedMac,
}

/// Outcome of checking one record against an expected authenticator.
/// A mismatch still carries what was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass(Authenticator),
    Mismatch(Authenticator),
    Failed(AuthError),
}

impl Verdict {
    pub fn computed(&self) -> Option<&Authenticator> {
        match self {
            Verdict::Pass(auth) | Verdict::Mismatch(auth) => Some(auth),
            Verdict::Failed(_) => None,
        }
    }

    pub fn status_code(&self) -> i32 {
        match self {
            Verdict::Pass(_) => 0,
            Verdict::Mismatch(_) => AuthError::VerificationMismatch.status_code(),
            Verdict::Failed(err) => err.status_code(),
        }
    }

    pub fn into_result(self) -> AuthResult<Authenticator> {
        match self {
            Verdict::Pass(auth) => Ok(auth),
            Verdict::Mismatch(_) => Err(AuthError::VerificationMismatch),
            Verdict::Failed(err) => Err(err),
        }
    }
}

/// Authenticator Engine: assemble, MAC, truncate, verify.
///
/// Holds no per-attempt state. Every buffer lives on the stack of the call
/// that uses it.
#[derive(Debug, Clone)]
pub struct Engine<B> {
    backend: B,
    truncation_len: usize,
}

impl<B: CipherBackend> Engine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            truncation_len: TRUNCATED_MAC_LEN,
        }
    }

    /// Override the authenticator length. Lengths over 16 are accepted here
    /// and rejected on use with `TruncationLengthInvalid`.
    pub fn with_truncation(mut self, n: usize) -> Self {
        self.truncation_len = n;
        self
    }

    pub fn truncation_len(&self) -> usize {
        self.truncation_len
    }

    pub fn authenticate(&self, key: &MacKey, record: &AuthenticatedRecord<'_>) -> AuthResult<Authenticator> {
        let buffer = record.assemble()?;
        stage_debug!("assembled {} byte record", buffer.len());
        let full = compute_mac(&self.backend, key, &buffer)?;
        let truncated = full.truncate(self.truncation_len)?;
        Ok(Authenticator { full, truncated })
    }

    /// Compute the authenticator for `record` and check it against
    /// `expected`, reporting every stage to `sink`.
    ///
    /// A mismatch is terminal for this record; it is reported with both
    /// values and returned as `VerificationMismatch`.
    pub fn check<S: ReportSink + ?Sized>(
        &self,
        key: &MacKey,
        record: &AuthenticatedRecord<'_>,
        expected: &TruncatedMac,
        sink: &mut S,
    ) -> AuthResult<Authenticator> {
        self.evaluate(key, record, expected, sink).into_result()
    }

    /// Like [`Engine::check`], but keeps the computed authenticator on a
    /// mismatch.
    pub fn evaluate<S: ReportSink + ?Sized>(
        &self,
        key: &MacKey,
        record: &AuthenticatedRecord<'_>,
        expected: &TruncatedMac,
        sink: &mut S,
    ) -> Verdict {
        report!(sink, "Starting CMAC computation...");

        let auth = match self.authenticate(key, record) {
            Ok(auth) => auth,
            Err(err) => {
                report!(sink, "Error: {}", err);
                return Verdict::Failed(err);
            }
        };

        if let Some(dump) = hex_or_report(sink, auth.full.as_bytes(), "full MAC") {
            report!(sink, "Calculated MAC (full {} bytes): {}", MAC_LEN, dump);
        }
        if let Some(dump) = hex_or_report(sink, auth.truncated.as_bytes(), "truncated MAC") {
            report!(
                sink,
                "Calculated MAC (truncated {} bytes): {}",
                auth.truncated.len(),
                dump
            );
        }

        if !verify(&auth.truncated, expected).is_match() {
            report_mismatch(sink, &auth.truncated, expected);
            return Verdict::Mismatch(auth);
        }

        if let Some(dump) = hex_or_report(sink, auth.truncated.as_bytes(), "success MAC") {
            report!(sink, "CMAC test passed. Calculated MAC: {}", dump);
        }
        Verdict::Pass(auth)
    }
}

fn hex_or_report<S: ReportSink + ?Sized>(sink: &mut S, bytes: &[u8], what: &str) -> Option<HexString> {
    let mut dump = HexString::new();
    match hex::format_into(bytes, Delimiter::Space, &mut dump) {
        Ok(()) => Some(dump),
        Err(err) => {
            report!(sink, "Error: Failed to format {} ({})", what, err);
            None
        }
    }
}

fn report_mismatch<S: ReportSink + ?Sized>(sink: &mut S, computed: &TruncatedMac, expected: &TruncatedMac) {
    let mut calculated = HexString::new();
    let mut received = HexString::new();
    let formatted = hex::format_into(computed.as_bytes(), Delimiter::Space, &mut calculated)
        .and_then(|_| hex::format_into(expected.as_bytes(), Delimiter::Space, &mut received));
    match formatted {
        Ok(()) => report!(
            sink,
            "MAC verification failed. Calculated: {} Received: {}",
            calculated,
            received
        ),
        Err(_) => report!(sink, "MAC verification failed. Error formatting calculated MAC"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SoftwareCmac;
    use crate::record::RecordLayout;
    use crate::report::CaptureSink;

    const KEY: MacKey = MacKey::new([
        0xFA, 0x7B, 0x0B, 0xCA, 0x18, 0x32, 0x95, 0xE4, 0xA3, 0x27, 0xB8, 0xC7, 0x2A, 0x1A, 0x4D,
        0xFF,
    ]);

    fn record() -> AuthenticatedRecord<'static> {
        AuthenticatedRecord::new(RecordLayout::REFERENCE, &[0x03, 0x09], &[0; 12], &[0; 8]).unwrap()
    }

    #[test]
    fn test_check_reports_pass() {
        let engine = Engine::new(SoftwareCmac);
        let expected = TruncatedMac::from_slice(&[0x6A, 0x0E, 0x6D]).unwrap();
        let mut sink = CaptureSink::new();

        let auth = engine.check(&KEY, &record(), &expected, &mut sink).unwrap();
        assert_eq!(auth.truncated, expected);
        assert_eq!(
            sink.lines,
            vec![
                "Starting CMAC computation...".to_string(),
                "Calculated MAC (full 16 bytes): 6A 0E 6D 87 C6 F9 0E 16 5D 05 8C 2C F9 06 15 E2"
                    .to_string(),
                "Calculated MAC (truncated 3 bytes): 6A 0E 6D".to_string(),
                "CMAC test passed. Calculated MAC: 6A 0E 6D".to_string(),
            ]
        );
    }

    #[test]
    fn test_check_reports_mismatch() {
        let engine = Engine::new(SoftwareCmac);
        let expected = TruncatedMac::from_slice(&[0x00, 0x11, 0x22]).unwrap();
        let mut sink = CaptureSink::new();

        let err = engine.check(&KEY, &record(), &expected, &mut sink).unwrap_err();
        assert_eq!(err, AuthError::VerificationMismatch);
        assert_eq!(err.status_code(), -6);
        assert!(sink.contains("MAC verification failed. Calculated: 6A 0E 6D Received: 00 11 22"));
        assert!(!sink.contains("CMAC test passed"));
    }

    #[test]
    fn test_mismatch_keeps_computed_authenticator() {
        let engine = Engine::new(SoftwareCmac);
        let expected = TruncatedMac::from_slice(&[0x00, 0x11, 0x22]).unwrap();
        let mut sink = CaptureSink::new();

        let verdict = engine.evaluate(&KEY, &record(), &expected, &mut sink);
        assert_eq!(verdict.status_code(), -6);
        let computed = verdict.computed().unwrap();
        assert_eq!(computed.truncated.as_bytes(), &[0x6A, 0x0E, 0x6D]);
        assert_eq!(verdict.into_result(), Err(AuthError::VerificationMismatch));
    }

    #[test]
    fn test_check_reports_truncation_error() {
        let engine = Engine::new(SoftwareCmac).with_truncation(20);
        let expected = TruncatedMac::from_slice(&[0x6A, 0x0E, 0x6D]).unwrap();
        let mut sink = CaptureSink::new();

        let err = engine.check(&KEY, &record(), &expected, &mut sink).unwrap_err();
        assert!(matches!(err, AuthError::TruncationLengthInvalid { requested: 20, .. }));
        assert_eq!(sink.lines.len(), 2);
        assert!(sink.lines[1].starts_with("Error: Truncation to 20 bytes"));
    }

    #[test]
    fn test_longer_authenticator() {
        let engine = Engine::new(SoftwareCmac).with_truncation(8);
        let auth = engine.authenticate(&KEY, &record()).unwrap();
        assert_eq!(auth.truncated.as_bytes(), &auth.full.as_bytes()[..8]);
    }
}
