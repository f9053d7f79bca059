//! Staged CMAC computation.
//!
//! The cipher layer is driven through the classic
//! `resolve -> setup -> starts -> update -> finish` sequence. Each step can
//! fail on its own and reports its own [`AuthError`] kind. The computation
//! context is owned by a [`MacContext`], which hands it back to the backend
//! exactly once when dropped, no matter which step bailed out.

use crate::key::{MacKey, KEY_BITS};
use crate::tag::{FullMac, MAC_LEN};
use crate::{stage_debug, AuthError, AuthResult};
use core::fmt;

// Cipher-layer status codes.
pub const ERR_CIPHER_FEATURE_UNAVAILABLE: i32 = -0x6080;
pub const ERR_CIPHER_BAD_INPUT_DATA: i32 = -0x6100;
pub const ERR_CIPHER_ALLOC_FAILED: i32 = -0x6180;
pub const ERR_CIPHER_INVALID_CONTEXT: i32 = -0x6380;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherId {
    Aes128Ecb,
    Aes192Ecb,
    Aes256Ecb,
}

impl fmt::Display for CipherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CipherId::Aes128Ecb => "AES-128-ECB",
            CipherId::Aes192Ecb => "AES-192-ECB",
            CipherId::Aes256Ecb => "AES-256-ECB",
        };
        f.write_str(name)
    }
}

/// What the backend knows about a resolved cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherInfo {
    pub id: CipherId,
    pub key_bits: usize,
    pub block_size: usize,
}

/// A block-cipher MAC primitive exposed as a staged context protocol.
///
/// Every context returned by `acquire` is passed to `release` exactly once.
/// Failing methods return the backend's raw (negative) status code.
pub trait CipherBackend {
    type Context;

    fn acquire(&self) -> Self::Context;
    fn resolve(&self, id: CipherId) -> Option<CipherInfo>;
    fn setup(&self, ctx: &mut Self::Context, info: &CipherInfo) -> Result<(), i32>;
    fn starts(&self, ctx: &mut Self::Context, key: &[u8], key_bits: usize) -> Result<(), i32>;
    fn update(&self, ctx: &mut Self::Context, input: &[u8]) -> Result<(), i32>;
    fn finish(&self, ctx: &mut Self::Context, output: &mut [u8; MAC_LEN]) -> Result<(), i32>;
    fn release(&self, ctx: Self::Context);
}

impl<B: CipherBackend + ?Sized> CipherBackend for &B {
    type Context = B::Context;

    fn acquire(&self) -> Self::Context {
        (**self).acquire()
    }

    fn resolve(&self, id: CipherId) -> Option<CipherInfo> {
        (**self).resolve(id)
    }

    fn setup(&self, ctx: &mut Self::Context, info: &CipherInfo) -> Result<(), i32> {
        (**self).setup(ctx, info)
    }

    fn starts(&self, ctx: &mut Self::Context, key: &[u8], key_bits: usize) -> Result<(), i32> {
        (**self).starts(ctx, key, key_bits)
    }

    fn update(&self, ctx: &mut Self::Context, input: &[u8]) -> Result<(), i32> {
        (**self).update(ctx, input)
    }

    fn finish(&self, ctx: &mut Self::Context, output: &mut [u8; MAC_LEN]) -> Result<(), i32> {
        (**self).finish(ctx, output)
    }

    fn release(&self, ctx: Self::Context) {
        (**self).release(ctx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Uninitialized,
    Ready,
    Keyed,
    Absorbing,
    Finalized,
    Failed,
}

/// One CMAC computation in flight. Not shareable; concurrent callers each
/// build their own.
pub struct MacContext<'b, B: CipherBackend> {
    backend: &'b B,
    inner: Option<B::Context>,
    state: ContextState,
}

impl<'b, B: CipherBackend> MacContext<'b, B> {
    pub fn new(backend: &'b B) -> Self {
        Self {
            backend,
            inner: Some(backend.acquire()),
            state: ContextState::Uninitialized,
        }
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Resolve `id` and bind it to the context.
    pub fn setup(&mut self, id: CipherId) -> AuthResult<()> {
        if self.state != ContextState::Uninitialized {
            return Err(self.fail(AuthError::SetupFailed(ERR_CIPHER_BAD_INPUT_DATA)));
        }
        let Some(info) = self.backend.resolve(id) else {
            return Err(self.fail(AuthError::AlgorithmUnsupported(id)));
        };
        // The CMAC output is one cipher block.
        if info.block_size != MAC_LEN {
            return Err(self.fail(AuthError::SetupFailed(ERR_CIPHER_FEATURE_UNAVAILABLE)));
        }
        self.step(
            &[ContextState::Uninitialized],
            AuthError::SetupFailed,
            ContextState::Ready,
            |backend, ctx| backend.setup(ctx, &info),
        )
    }

    pub fn starts(&mut self, key: &MacKey) -> AuthResult<()> {
        self.step(
            &[ContextState::Ready],
            AuthError::KeyInitFailed,
            ContextState::Keyed,
            |backend, ctx| backend.starts(ctx, key.as_bytes(), KEY_BITS),
        )
    }

    pub fn update(&mut self, input: &[u8]) -> AuthResult<()> {
        self.step(
            &[ContextState::Keyed, ContextState::Absorbing],
            AuthError::UpdateFailed,
            ContextState::Absorbing,
            |backend, ctx| backend.update(ctx, input),
        )
    }

    /// Extract the MAC. Consumes the context, which releases it.
    pub fn finish(mut self) -> AuthResult<FullMac> {
        let mut output = [0u8; MAC_LEN];
        self.step(
            &[ContextState::Keyed, ContextState::Absorbing],
            AuthError::FinalizeFailed,
            ContextState::Finalized,
            |backend, ctx| backend.finish(ctx, &mut output),
        )?;
        Ok(FullMac::from_bytes(output))
    }

    fn step<F>(
        &mut self,
        allowed: &[ContextState],
        kind: fn(i32) -> AuthError,
        next: ContextState,
        op: F,
    ) -> AuthResult<()>
    where
        F: FnOnce(&B, &mut B::Context) -> Result<(), i32>,
    {
        if !allowed.contains(&self.state) {
            return Err(self.fail(kind(ERR_CIPHER_BAD_INPUT_DATA)));
        }
        let backend = self.backend;
        let outcome = match self.inner.as_mut() {
            Some(ctx) => op(backend, ctx),
            None => Err(ERR_CIPHER_INVALID_CONTEXT),
        };
        match outcome {
            Ok(()) => {
                stage_debug!("cmac context {:?} -> {:?}", self.state, next);
                self.state = next;
                Ok(())
            }
            Err(code) => Err(self.fail(kind(code))),
        }
    }

    fn fail(&mut self, err: AuthError) -> AuthError {
        stage_debug!("cmac context {:?} failed: {}", self.state, err);
        self.state = ContextState::Failed;
        err
    }
}

impl<B: CipherBackend> Drop for MacContext<'_, B> {
    fn drop(&mut self) {
        if let Some(ctx) = self.inner.take() {
            self.backend.release(ctx);
        }
    }
}

/// AES-128 CMAC of `input` under `key`.
pub fn compute_mac<B: CipherBackend>(backend: &B, key: &MacKey, input: &[u8]) -> AuthResult<FullMac> {
    let mut ctx = MacContext::new(backend);
    ctx.setup(CipherId::Aes128Ecb)?;
    ctx.starts(key)?;
    ctx.update(input)?;
    ctx.finish()
}
