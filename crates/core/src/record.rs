use crate::{AuthError, AuthResult};
use core::fmt;

/// Capacity of the stack buffer a record is assembled into.
pub const MAX_RECORD_LEN: usize = 64;

pub type RecordBuffer = heapless::Vec<u8, MAX_RECORD_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Identifier,
    Payload,
    Freshness,
    /// The assembled buffer as a whole.
    Record,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordField::Identifier => "identifier",
            RecordField::Payload => "payload",
            RecordField::Freshness => "freshness",
            RecordField::Record => "record",
        };
        f.write_str(name)
    }
}

/// Agreed field lengths of an authenticated record. Both peers must use the
/// same layout or their MACs will never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    pub identifier_len: usize,
    pub payload_len: usize,
    pub freshness_len: usize,
}

impl RecordLayout {
    /// 2-byte data id, 12-byte payload, 8-byte freshness value.
    pub const REFERENCE: Self = Self {
        identifier_len: 2,
        payload_len: 12,
        freshness_len: 8,
    };

    pub const fn total_len(&self) -> usize {
        self.identifier_len + self.payload_len + self.freshness_len
    }

    pub fn validate(&self) -> AuthResult<()> {
        let total = self.total_len();
        if total > MAX_RECORD_LEN {
            return Err(AuthError::RecordLengthInvalid {
                field: RecordField::Record,
                expected: MAX_RECORD_LEN,
                actual: total,
            });
        }
        Ok(())
    }
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Borrowed view of `identifier || payload || freshness`, checked against a
/// layout on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedRecord<'a> {
    identifier: &'a [u8],
    payload: &'a [u8],
    freshness: &'a [u8],
}

impl<'a> AuthenticatedRecord<'a> {
    pub fn new(
        layout: RecordLayout,
        identifier: &'a [u8],
        payload: &'a [u8],
        freshness: &'a [u8],
    ) -> AuthResult<Self> {
        layout.validate()?;
        check_field(RecordField::Identifier, layout.identifier_len, identifier)?;
        check_field(RecordField::Payload, layout.payload_len, payload)?;
        check_field(RecordField::Freshness, layout.freshness_len, freshness)?;
        Ok(Self {
            identifier,
            payload,
            freshness,
        })
    }

    pub fn identifier(&self) -> &'a [u8] {
        self.identifier
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn freshness(&self) -> &'a [u8] {
        self.freshness
    }

    pub fn len(&self) -> usize {
        self.identifier.len() + self.payload.len() + self.freshness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn assemble(&self) -> AuthResult<RecordBuffer> {
        assemble(self.identifier, self.payload, self.freshness)
    }
}

fn check_field(field: RecordField, expected: usize, bytes: &[u8]) -> AuthResult<()> {
    if bytes.len() != expected {
        return Err(AuthError::RecordLengthInvalid {
            field,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Concatenate the three fields in wire order. No padding, no length
/// prefixes.
pub fn assemble(identifier: &[u8], payload: &[u8], freshness: &[u8]) -> AuthResult<RecordBuffer> {
    let total = identifier.len() + payload.len() + freshness.len();
    let overflow = AuthError::RecordLengthInvalid {
        field: RecordField::Record,
        expected: MAX_RECORD_LEN,
        actual: total,
    };

    let mut buffer = RecordBuffer::new();
    for part in [identifier, payload, freshness] {
        buffer.extend_from_slice(part).map_err(|_| overflow)?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_order() {
        let buffer = assemble(&[0x03, 0x09], &[0xAA; 12], &[0x55; 8]).unwrap();
        assert_eq!(buffer.len(), 22);
        assert_eq!(&buffer[..2], &[0x03, 0x09]);
        assert_eq!(&buffer[2..14], &[0xAA; 12]);
        assert_eq!(&buffer[14..], &[0x55; 8]);
    }

    #[test]
    fn test_record_rejects_wrong_field_length() {
        let err = AuthenticatedRecord::new(RecordLayout::REFERENCE, &[0x03], &[0; 12], &[0; 8])
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::RecordLengthInvalid {
                field: RecordField::Identifier,
                expected: 2,
                actual: 1,
            }
        );

        let err = AuthenticatedRecord::new(RecordLayout::REFERENCE, &[0x03, 0x09], &[0; 12], &[0; 9])
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::RecordLengthInvalid {
                field: RecordField::Freshness,
                ..
            }
        ));
        assert_eq!(err.status_code(), -8);
    }

    #[test]
    fn test_layout_larger_than_buffer() {
        let layout = RecordLayout {
            identifier_len: 2,
            payload_len: 60,
            freshness_len: 8,
        };
        assert_eq!(
            layout.validate(),
            Err(AuthError::RecordLengthInvalid {
                field: RecordField::Record,
                expected: MAX_RECORD_LEN,
                actual: 70,
            })
        );
        assert!(assemble(&[0; 2], &[0; 60], &[0; 8]).is_err());
    }

    #[test]
    fn test_record_assemble_matches_free_fn() {
        let record =
            AuthenticatedRecord::new(RecordLayout::REFERENCE, &[0x03, 0x09], &[1; 12], &[2; 8])
                .unwrap();
        assert_eq!(record.len(), RecordLayout::REFERENCE.total_len());
        assert_eq!(
            record.assemble().unwrap(),
            assemble(&[0x03, 0x09], &[1; 12], &[2; 8]).unwrap()
        );
    }
}
