//! Cipher trait for swappable authenticated encryption backends.

use std::sync::Arc;

use crate::error::CryptError;

/// Authenticated encryption under a key the implementation owns.
///
/// [`EncryptedValue`](crate::EncryptedValue) depends only on this trait, so the
/// AES-GCM construction can be replaced by another AEAD or by a test double.
/// Implementations must be safe to call from many threads at once.
pub trait Cipher: Send + Sync {
    /// Encrypt `plaintext` into a self-authenticating blob.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptError>;

    /// Decrypt a blob previously produced by [`encrypt`](Self::encrypt).
    ///
    /// Must never return plaintext unless authentication succeeded.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptError>;
}

impl<C: Cipher + ?Sized> Cipher for &C {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptError> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptError> {
        (**self).decrypt(ciphertext)
    }
}

impl<C: Cipher + ?Sized> Cipher for Arc<C> {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptError> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptError> {
        (**self).decrypt(ciphertext)
    }
}

impl<C: Cipher + ?Sized> Cipher for Box<C> {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptError> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptError> {
        (**self).decrypt(ciphertext)
    }
}
