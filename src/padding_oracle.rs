//! A CBC padding-validity oracle.
//!
//! This is the primitive a padding-oracle attack is built from: a yes/no
//! answer about the trailing padding of a decrypted ciphertext. The full
//! iterative plaintext-recovery attack is deliberately not implemented
//! here.

use crate::aes::{decrypt_aes_128_cbc_raw, BLOCK_SIZE};
use crate::pkcs7;

pub struct PaddingValidityOracle {
    key: [u8; BLOCK_SIZE],
}

impl PaddingValidityOracle {
    pub fn new(key: [u8; BLOCK_SIZE]) -> Self {
        Self { key }
    }

    /// Decrypt under the oracle's key and judge the trailing padding.
    ///
    /// Malformed padding is an `Ok(false)` verdict, never a failure; an
    /// `Err` is reserved for contract violations the caller made
    /// (non-block-aligned ciphertext), which are a different thing from a
    /// wrong guess.
    pub fn is_valid_padding(
        &self,
        iv: &[u8; BLOCK_SIZE],
        ciphertext: &[u8],
    ) -> Result<bool, String> {
        let plaintext = decrypt_aes_128_cbc_raw(ciphertext, &self.key, iv)?;
        Ok(pkcs7::is_valid(&plaintext, BLOCK_SIZE as u8))
    }
}
