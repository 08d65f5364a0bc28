//! Encrypted value container and its storable-form contract.
//!
//! Write path: plaintext → [`Cipher::encrypt`] → padded base64 text.
//! Read path: stored bytes → base64 decode → [`Cipher::decrypt`] → plaintext.

use {base64::Engine, zeroize::Zeroizing};

use crate::{aes256gcm::Aes256GcmCipher, error::CryptError, traits::Cipher};

/// Encrypt `plaintext` and encode the result for a text column.
pub fn encode_storable<C: Cipher + ?Sized>(
    cipher: &C,
    plaintext: &[u8],
) -> Result<String, CryptError> {
    let ciphertext = cipher.encrypt(plaintext)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(ciphertext))
}

/// Decode a stored cell and decrypt it.
///
/// Decoding errors are reported before the cipher is ever called.
pub fn decode_storable<C: Cipher + ?Sized>(
    cipher: &C,
    raw: &[u8],
) -> Result<Vec<u8>, CryptError> {
    let ciphertext = base64::engine::general_purpose::STANDARD
        .decode(raw)
        .map_err(|e| {
            #[cfg(feature = "tracing")]
            tracing::warn!(len = raw.len(), error = %e, "stored value is not valid base64");
            CryptError::from(e)
        })?;
    cipher.decrypt(&ciphertext)
}

/// A plaintext buffer bound to a [`Cipher`].
///
/// Generic over [`Cipher`] but defaults to [`Aes256GcmCipher`]. To share one
/// key between many values, bind them to `&C` or `Arc<C>`.
///
/// Mutating methods take `&mut self`; a single value is not meant to be
/// written from several threads at once.
pub struct EncryptedValue<C: Cipher = Aes256GcmCipher> {
    cipher: C,
    plaintext: Zeroizing<Vec<u8>>,
}

impl<C: Cipher> EncryptedValue<C> {
    /// Create an empty value bound to `cipher`.
    pub fn new(cipher: C) -> Self {
        Self {
            cipher,
            plaintext: Zeroizing::new(Vec::new()),
        }
    }

    /// Set the plaintext to be encrypted, builder style.
    #[must_use]
    pub fn with_plaintext(mut self, plaintext: impl Into<Vec<u8>>) -> Self {
        self.set_plaintext(plaintext);
        self
    }

    /// Replace the plaintext to be encrypted.
    pub fn set_plaintext(&mut self, plaintext: impl Into<Vec<u8>>) {
        self.plaintext = Zeroizing::new(plaintext.into());
    }

    pub fn plaintext(&self) -> &[u8] {
        &self.plaintext
    }

    /// Take the plaintext out of the value.
    pub fn into_plaintext(mut self) -> Vec<u8> {
        std::mem::take(&mut *self.plaintext)
    }

    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    /// Encrypt the current plaintext and return its storable form.
    ///
    /// Every call draws a fresh nonce, so repeated calls return different text.
    pub fn to_storable(&self) -> Result<String, CryptError> {
        encode_storable(&self.cipher, &self.plaintext)
    }

    /// Decode and decrypt `raw`, replacing the plaintext on success.
    ///
    /// On error the current plaintext is left as it was.
    pub fn from_storable(&mut self, raw: impl AsRef<[u8]>) -> Result<(), CryptError> {
        let plaintext = decode_storable(&self.cipher, raw.as_ref())?;
        self.plaintext = Zeroizing::new(plaintext);
        Ok(())
    }
}

impl<C: Cipher> std::fmt::Debug for EncryptedValue<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedValue")
            .field("plaintext_len", &self.plaintext.len())
            .finish_non_exhaustive()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod tests {
    use {super::*, crate::aes256gcm::KEY_LEN, rstest::rstest};

    /// Cipher returning canned bytes regardless of input.
    pub(crate) struct MockCipher;

    impl Cipher for MockCipher {
        fn encrypt(&self, _plaintext: &[u8]) -> Result<Vec<u8>, CryptError> {
            Ok(vec![0, 0, 1])
        }

        fn decrypt(&self, _ciphertext: &[u8]) -> Result<Vec<u8>, CryptError> {
            Ok(vec![0, 0, 2])
        }
    }

    /// Cipher that fails both directions.
    struct FailingCipher;

    impl Cipher for FailingCipher {
        fn encrypt(&self, _plaintext: &[u8]) -> Result<Vec<u8>, CryptError> {
            Err(CryptError::RandomSource("entropy exhausted".to_string()))
        }

        fn decrypt(&self, _ciphertext: &[u8]) -> Result<Vec<u8>, CryptError> {
            Err(CryptError::Authentication)
        }
    }

    fn gcm() -> Aes256GcmCipher {
        let mut key = [0u8; KEY_LEN];
        key[0] = 0x01;
        Aes256GcmCipher::new(&key)
    }

    #[test]
    fn to_storable_encodes_cipher_output() {
        let value = EncryptedValue::new(MockCipher).with_plaintext("top-secret");
        assert_eq!(value.to_storable().unwrap(), "AAAB");
    }

    #[test]
    fn from_storable_stores_cipher_output() {
        let mut value = EncryptedValue::new(MockCipher);
        value.from_storable("AAAC").unwrap();
        assert_eq!(value.plaintext(), &[0u8, 0, 2]);
    }

    #[rstest]
    #[case::empty(b"".to_vec())]
    #[case::text(b"some-secret".to_vec())]
    #[case::binary(vec![0xc3, 0x28, 0xa0, 0xa1, 0x00, 0xff])]
    fn storable_round_trip(#[case] plaintext: Vec<u8>) {
        let written = EncryptedValue::new(gcm()).with_plaintext(plaintext.clone());
        let stored = written.to_storable().unwrap();

        let mut read = EncryptedValue::new(gcm());
        read.from_storable(&stored).unwrap();
        assert_eq!(read.plaintext(), plaintext.as_slice());
    }

    #[test]
    fn unset_plaintext_encrypts_as_empty() {
        let stored = EncryptedValue::new(gcm()).to_storable().unwrap();

        let mut read = EncryptedValue::new(gcm()).with_plaintext("stale");
        read.from_storable(stored).unwrap();
        assert!(read.plaintext().is_empty());
    }

    #[test]
    fn storable_form_length_matches_padded_base64() {
        let stored = EncryptedValue::new(gcm())
            .with_plaintext("some-secret")
            .to_storable()
            .unwrap();
        assert_eq!(stored.len(), 52);
    }

    #[test]
    fn repeated_to_storable_differs() {
        let value = EncryptedValue::new(gcm()).with_plaintext("same");
        assert_ne!(value.to_storable().unwrap(), value.to_storable().unwrap());
    }

    #[test]
    fn cipher_errors_pass_through_unchanged() {
        let value = EncryptedValue::new(FailingCipher).with_plaintext("x");
        assert!(matches!(
            value.to_storable(),
            Err(CryptError::RandomSource(msg)) if msg == "entropy exhausted"
        ));

        let mut value = EncryptedValue::new(FailingCipher);
        assert!(matches!(
            value.from_storable("AAAA"),
            Err(CryptError::Authentication)
        ));
    }

    #[rstest]
    #[case::bad_alphabet("not base64!")]
    #[case::missing_padding("AAA")]
    #[case::url_safe_alphabet("-_-_")]
    fn invalid_base64_is_rejected_before_decrypt(#[case] raw: &str) {
        // MockCipher would happily "decrypt" anything, so reaching it would succeed.
        let mut value = EncryptedValue::new(MockCipher).with_plaintext("kept");
        assert!(matches!(
            value.from_storable(raw),
            Err(CryptError::Encoding(_))
        ));
        assert_eq!(value.plaintext(), b"kept");
    }

    #[test]
    fn failed_decrypt_leaves_plaintext_untouched() {
        let stored = EncryptedValue::new(gcm())
            .with_plaintext("original")
            .to_storable()
            .unwrap();

        let mut other_key = EncryptedValue::new(Aes256GcmCipher::new(&[0x02; KEY_LEN]))
            .with_plaintext("kept");
        assert!(matches!(
            other_key.from_storable(&stored),
            Err(CryptError::Authentication)
        ));
        assert_eq!(other_key.plaintext(), b"kept");
    }

    #[test]
    fn truncated_storable_is_malformed() {
        // 8 base64 chars decode to 6 bytes, fewer than a nonce.
        let mut value = EncryptedValue::new(gcm());
        assert!(matches!(
            value.from_storable("AAAAAAAA"),
            Err(CryptError::MalformedCiphertext { len: 6, .. })
        ));
    }

    #[test]
    fn shared_cipher_via_arc_and_ref() {
        let cipher = std::sync::Arc::new(gcm());
        let stored = EncryptedValue::new(cipher.clone())
            .with_plaintext("shared")
            .to_storable()
            .unwrap();

        let mut read = EncryptedValue::new(&*cipher);
        read.from_storable(&stored).unwrap();
        assert_eq!(read.into_plaintext(), b"shared");
    }

    #[test]
    fn dyn_cipher_is_accepted() {
        let cipher: std::sync::Arc<dyn Cipher> = std::sync::Arc::new(MockCipher);
        let value = EncryptedValue::new(cipher).with_plaintext("x");
        assert_eq!(value.to_storable().unwrap(), "AAAB");
    }

    #[test]
    fn debug_hides_plaintext() {
        let value = EncryptedValue::new(MockCipher).with_plaintext("hunter2");
        let rendered = format!("{value:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("plaintext_len: 7"));
    }
}
