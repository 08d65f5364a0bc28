//! AES-256-GCM implementation of the [`Cipher`] trait.

#[allow(deprecated)] // upstream generic-array 0.x deprecation
use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use {
    base64::Engine,
    rand::{TryRngCore, rngs::OsRng},
    zeroize::Zeroizing,
};

use crate::{error::CryptError, traits::Cipher};

/// Key size for AES-256 (32 bytes).
pub const KEY_LEN: usize = 32;

/// Nonce size for GCM (96 bits).
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag size (16 bytes).
pub const TAG_LEN: usize = 16;

/// Length of the blob [`Aes256GcmCipher::encrypt`] produces for `plaintext_len` bytes.
pub const fn sealed_len(plaintext_len: usize) -> usize {
    NONCE_LEN + plaintext_len + TAG_LEN
}

/// AES-256 in Galois/Counter Mode.
///
/// Encrypted blob layout: `[nonce: 12 bytes][ciphertext: N bytes][GCM tag: 16 bytes]`.
/// No associated data is bound and no version byte is written, so the layout
/// stays readable by anything that stored values in it before.
///
/// The key is copied in at construction and wiped on drop. The cipher holds no
/// other state, so one instance can serve any number of concurrent callers.
#[derive(Clone)]
pub struct Aes256GcmCipher {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl Aes256GcmCipher {
    /// Create a cipher from a 256-bit key.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            key: Zeroizing::new(*key),
        }
    }

    /// Create a cipher from a key of unchecked length.
    ///
    /// Anything other than [`KEY_LEN`] bytes is rejected here, so encryption
    /// and decryption never see a malformed key.
    pub fn from_slice(key: &[u8]) -> Result<Self, CryptError> {
        let key: &[u8; KEY_LEN] = key.try_into().map_err(|_| CryptError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: key.len(),
        })?;
        Ok(Self::new(key))
    }

    /// Create a cipher from a standard (padded) base64 encoded key.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptError> {
        let raw = Zeroizing::new(base64::engine::general_purpose::STANDARD.decode(encoded.trim())?);
        Self::from_slice(&raw)
    }

    fn aead(&self) -> Aes256Gcm {
        let key: &[u8; KEY_LEN] = &self.key;
        Aes256Gcm::new(key.into())
    }
}

impl std::fmt::Debug for Aes256GcmCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aes256GcmCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl Cipher for Aes256GcmCipher {
    #[allow(deprecated)]
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.try_fill_bytes(&mut nonce_bytes).map_err(|e| {
            #[cfg(feature = "tracing")]
            tracing::error!(error = %e, "secure random source failed while drawing nonce");
            CryptError::RandomSource(e.to_string())
        })?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let sealed = self
            .aead()
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptError::Seal)?;

        let mut result = Vec::with_capacity(NONCE_LEN + sealed.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&sealed);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            plaintext_len = plaintext.len(),
            ciphertext_len = result.len(),
            "sealed value"
        );

        Ok(result)
    }

    #[allow(deprecated)]
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptError> {
        // A blob of exactly NONCE_LEN bytes passes here and fails authentication.
        if ciphertext.len() < NONCE_LEN {
            #[cfg(feature = "tracing")]
            tracing::warn!(len = ciphertext.len(), "ciphertext shorter than nonce");
            return Err(CryptError::malformed(ciphertext.len()));
        }

        let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self.aead().decrypt(nonce, sealed).map_err(|_| {
            #[cfg(feature = "tracing")]
            tracing::warn!(len = ciphertext.len(), "ciphertext failed authentication");
            CryptError::Authentication
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(plaintext_len = plaintext.len(), "opened value");

        Ok(plaintext)
    }
}
