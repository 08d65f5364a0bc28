//! Transparent encryption of values stored in a database column.
//!
//! On write, an [`EncryptedValue`] seals its plaintext with AES-256-GCM under a
//! fresh random nonce and encodes `nonce || ciphertext || tag` as padded
//! base64 text. On read, the stored text is decoded, authenticated and
//! decrypted back into the value. Trait-based [`Cipher`] design allows swapping
//! the encryption backend.
//!
//! The key is supplied by the caller. Nothing here derives, stores or rotates
//! keys.

pub mod aes256gcm;
pub mod error;
#[cfg(feature = "sqlx")]
pub mod sqlite;
pub mod traits;
pub mod value;

#[cfg(feature = "sqlx")]
pub use sqlite::StoredCell;
pub use {
    aes256gcm::{Aes256GcmCipher, KEY_LEN, NONCE_LEN, TAG_LEN},
    error::CryptError,
    traits::Cipher,
    value::{EncryptedValue, decode_storable, encode_storable},
};
