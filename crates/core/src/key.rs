use core::fmt;

pub const KEY_LEN: usize = 16;
/// Key length as handed to the cipher layer, in bits.
pub const KEY_BITS: usize = KEY_LEN * 8;

/// 128-bit CMAC key. Immutable once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct MacKey([u8; KEY_LEN]);

impl MacKey {
    pub const fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for MacKey {
    type Error = core::array::TryFromSliceError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(<[u8; KEY_LEN]>::try_from(bytes)?))
    }
}

// Key material stays out of logs.
impl fmt::Debug for MacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MacKey(..)")
    }
}
