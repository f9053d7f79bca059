use core::fmt::{self, Write};

/// Large enough for a full MAC dump: 16 bytes as `XX ` minus the trailing
/// space, plus headroom.
pub const HEX_BUFFER_SIZE: usize = 64;

pub type HexString = heapless::String<HEX_BUFFER_SIZE>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    /// `6A 0E 6D`
    #[default]
    Space,
    /// `6A0E6D`
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("hex dump needs {needed} bytes, buffer holds {available}")]
pub struct HexBufferTooSmall {
    pub needed: usize,
    pub available: usize,
}

pub const fn encoded_len(bytes: usize, delimiter: Delimiter) -> usize {
    match delimiter {
        Delimiter::None => bytes * 2,
        Delimiter::Space if bytes == 0 => 0,
        Delimiter::Space => bytes * 3 - 1,
    }
}

/// Uppercase hex view of a byte slice, for use in format strings.
#[derive(Debug, Clone, Copy)]
pub struct HexDump<'a> {
    bytes: &'a [u8],
    delimiter: Delimiter,
}

impl<'a> HexDump<'a> {
    pub fn new(bytes: &'a [u8], delimiter: Delimiter) -> Self {
        Self { bytes, delimiter }
    }
}

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 && self.delimiter == Delimiter::Space {
                f.write_char(' ')?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

/// Render `bytes` into `out`, replacing its contents. Fails without writing
/// anything if the dump would not fit.
pub fn format_into<const N: usize>(
    bytes: &[u8],
    delimiter: Delimiter,
    out: &mut heapless::String<N>,
) -> Result<(), HexBufferTooSmall> {
    let needed = encoded_len(bytes.len(), delimiter);
    let too_small = HexBufferTooSmall {
        needed,
        available: N,
    };
    out.clear();
    if needed > N {
        return Err(too_small);
    }
    write!(out, "{}", HexDump::new(bytes, delimiter)).map_err(|_| too_small)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_delimited() {
        let mut out = HexString::new();
        format_into(&[0x6A, 0x0E, 0x6D], Delimiter::Space, &mut out).unwrap();
        assert_eq!(out.as_str(), "6A 0E 6D");
    }

    #[test]
    fn test_concatenated() {
        let mut out = HexString::new();
        format_into(&[0x00, 0xff, 0x10], Delimiter::None, &mut out).unwrap();
        assert_eq!(out.as_str(), "00FF10");
    }

    #[test]
    fn test_empty_input() {
        let mut out = HexString::new();
        format_into(&[], Delimiter::Space, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_full_mac_fits() {
        let mut out = HexString::new();
        format_into(&[0xAB; 16], Delimiter::Space, &mut out).unwrap();
        assert_eq!(out.len(), 47);
    }

    #[test]
    fn test_buffer_too_small() {
        let mut out: heapless::String<8> = heapless::String::new();
        format_into(&[1, 2, 3], Delimiter::Space, &mut out).unwrap();
        assert_eq!(out.as_str(), "01 02 03");

        let err = format_into(&[1, 2, 3, 4], Delimiter::Space, &mut out).unwrap_err();
        assert_eq!(
            err,
            HexBufferTooSmall {
                needed: 11,
                available: 8
            }
        );
        assert!(out.is_empty());
    }
}
