use crate::mac::{CipherBackend, CipherId, CipherInfo, ERR_CIPHER_BAD_INPUT_DATA};
use crate::tag::MAC_LEN;
use aes::Aes128;
use cmac::{Cmac, Mac};

/// Software AES-128 CMAC (RFC 4493) on top of the RustCrypto `cmac` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareCmac;

#[derive(Default)]
pub struct SoftwareContext {
    cipher: Option<CipherInfo>,
    mac: Option<Cmac<Aes128>>,
}

impl CipherBackend for SoftwareCmac {
    type Context = SoftwareContext;

    fn acquire(&self) -> SoftwareContext {
        SoftwareContext::default()
    }

    fn resolve(&self, id: CipherId) -> Option<CipherInfo> {
        match id {
            CipherId::Aes128Ecb => Some(CipherInfo {
                id,
                key_bits: 128,
                block_size: 16,
            }),
            _ => None,
        }
    }

    fn setup(&self, ctx: &mut SoftwareContext, info: &CipherInfo) -> Result<(), i32> {
        if ctx.cipher.is_some() {
            return Err(ERR_CIPHER_BAD_INPUT_DATA);
        }
        ctx.cipher = Some(*info);
        Ok(())
    }

    fn starts(&self, ctx: &mut SoftwareContext, key: &[u8], key_bits: usize) -> Result<(), i32> {
        let info = ctx.cipher.ok_or(ERR_CIPHER_BAD_INPUT_DATA)?;
        if key_bits != info.key_bits || key.len() * 8 != key_bits {
            return Err(ERR_CIPHER_BAD_INPUT_DATA);
        }
        let mac = <Cmac<Aes128> as Mac>::new_from_slice(key).map_err(|_| ERR_CIPHER_BAD_INPUT_DATA)?;
        ctx.mac = Some(mac);
        Ok(())
    }

    fn update(&self, ctx: &mut SoftwareContext, input: &[u8]) -> Result<(), i32> {
        let mac = ctx.mac.as_mut().ok_or(ERR_CIPHER_BAD_INPUT_DATA)?;
        mac.update(input);
        Ok(())
    }

    fn finish(&self, ctx: &mut SoftwareContext, output: &mut [u8; MAC_LEN]) -> Result<(), i32> {
        let mac = ctx.mac.take().ok_or(ERR_CIPHER_BAD_INPUT_DATA)?;
        let tag = mac.finalize().into_bytes();
        output.copy_from_slice(tag.as_slice());
        Ok(())
    }

    fn release(&self, ctx: SoftwareContext) {
        drop(ctx);
    }
}
