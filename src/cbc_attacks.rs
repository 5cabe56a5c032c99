//! Bit-flipping forgery against CBC ciphertexts.
//!
//! CBC decryption computes `P_i = Dec(C_i) ^ C_{i-1}`, so flipping bit b of
//! ciphertext block i-1 flips bit b of plaintext block i, at the price of
//! scrambling plaintext block i-1 entirely.

use crate::aes::{decrypt_aes_128_cbc, encrypt_aes_128_cbc, BLOCK_SIZE};
use crate::xor::xor_bytes;

/// Rewrite the plaintext of ciphertext block `block_idx` from `known` to
/// `desired`, starting `offset` bytes into the block.
///
/// The caller must already know the plaintext bytes being replaced (the
/// chosen-plaintext precondition), and must be able to sacrifice block
/// `block_idx - 1`, whose plaintext decrypts to garbage afterwards.
///
/// Errors when `block_idx` is 0 (there is no preceding block to flip; this
/// implementation does not edit the IV), when `known` and `desired` differ
/// in length, or when the edit runs past the end of the block or the
/// ciphertext.
pub fn flip_cbc_plaintext(
    ciphertext: &mut [u8],
    block_idx: usize,
    offset: usize,
    known: &[u8],
    desired: &[u8],
) -> Result<(), String> {
    if block_idx == 0 {
        return Err("cannot flip plaintext of block 0: no preceding ciphertext block".to_string());
    }
    if known.len() != desired.len() {
        return Err(format!(
            "known ({}) and desired ({}) byte runs differ in length",
            known.len(),
            desired.len()
        ));
    }
    if offset + known.len() > BLOCK_SIZE {
        return Err(format!(
            "edit of {} bytes at offset {offset} overruns the {BLOCK_SIZE}-byte block",
            known.len()
        ));
    }
    if (block_idx + 1) * BLOCK_SIZE > ciphertext.len() {
        return Err(format!(
            "block index {block_idx} is out of range for a {}-byte ciphertext",
            ciphertext.len()
        ));
    }

    let delta = xor_bytes(known, desired)?;
    let edit_start = (block_idx - 1) * BLOCK_SIZE + offset;
    for (byte, d) in ciphertext[edit_start..].iter_mut().zip(delta.iter()) {
        *byte ^= d;
    }
    Ok(())
}

/// A CBC encryptor for user-comment cookies. User data is quoted to keep
/// `;` and `=` out of the plaintext, which is exactly what the bit-flipping
/// forgery sidesteps.
pub struct CookieOracle {
    key: [u8; BLOCK_SIZE],
    iv: [u8; BLOCK_SIZE],
}

impl CookieOracle {
    const PREFIX: &'static [u8] = b"comment1=cooking%20MCs;userdata=";
    const SUFFIX: &'static [u8] = b";comment2=%20like%20a%20pound%20of%20bacon";

    pub fn new(key: [u8; BLOCK_SIZE], iv: [u8; BLOCK_SIZE]) -> Self {
        Self { key, iv }
    }

    pub fn encrypt(&self, user_data: &[u8]) -> Vec<u8> {
        let quoted: Vec<u8> = user_data
            .iter()
            .copied()
            .filter(|b| !matches!(b, b';' | b'=' | b'"'))
            .collect();
        let plaintext = [Self::PREFIX, &quoted, Self::SUFFIX].concat();
        encrypt_aes_128_cbc(&plaintext, &self.key, &self.iv)
    }

    pub fn is_admin(&self, ciphertext: &[u8]) -> Result<bool, String> {
        let plaintext = decrypt_aes_128_cbc(ciphertext, &self.key, &self.iv)?;
        Ok(plaintext
            .split(|&b| b == b';')
            .any(|field| field == b"admin=true"))
    }
}

/// Forge a ciphertext that decrypts to contain `;admin=true;` even though
/// the oracle quotes those characters out of user data.
///
/// Submits two blocks of user data: a sacrificial block, then a block of
/// known filler. The oracle's 32-byte fixed prefix keeps both block
/// aligned, so flipping the sacrificial block rewrites the filler block's
/// plaintext into the admin marker.
pub fn forge_admin_cookie(oracle: &CookieOracle) -> Result<Vec<u8>, String> {
    let known_block = b"AAAAAAAAAAAAAAAA";
    let user_data = [b"XXXXXXXXXXXXXXXX".as_slice(), known_block].concat();
    let mut ciphertext = oracle.encrypt(&user_data);

    // Prefix is exactly two blocks, so the sacrificial block is ciphertext
    // block 2 and the filler plaintext lives in block 3.
    flip_cbc_plaintext(&mut ciphertext, 3, 0, known_block, b";admin=true;AAAA")?;
    Ok(ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::util::random_bytes;

    #[test]
    fn forged_cookie_passes_admin_check() {
        let oracle = CookieOracle::new(random_bytes::<16>(), random_bytes::<16>());

        let forged = forge_admin_cookie(&oracle).unwrap();

        assert!(oracle.is_admin(&forged).unwrap());
    }

    #[test]
    fn submitting_admin_marker_directly_is_quoted_out() {
        let oracle = CookieOracle::new(random_bytes::<16>(), random_bytes::<16>());

        let ciphertext = oracle.encrypt(b";admin=true;");

        assert!(!oracle.is_admin(&ciphertext).unwrap());
    }

    #[test]
    fn flip_rewrites_target_bytes_and_scrambles_preceding_block() {
        let key = random_bytes::<16>();
        let iv = random_bytes::<16>();
        let plaintext = b"0123456789abcdefWe all live in a0123456789abcdef";
        let mut ciphertext = encrypt_aes_128_cbc(plaintext, &key, &iv);

        flip_cbc_plaintext(&mut ciphertext, 1, 8, b"ive in a", b"ove on a").unwrap();

        let decrypted = decrypt_aes_128_cbc(&ciphertext, &key, &iv).unwrap();
        assert_eq!(&decrypted[16..32], b"We all love on a");
        assert_ne!(&decrypted[..16], b"0123456789abcdef");
        assert_eq!(&decrypted[32..48], b"0123456789abcdef");
    }

    #[test]
    fn flip_rejects_bad_arguments() {
        let mut ciphertext = vec![0u8; 48];

        assert!(flip_cbc_plaintext(&mut ciphertext, 0, 0, b"a", b"b").is_err());
        assert!(flip_cbc_plaintext(&mut ciphertext, 1, 0, b"ab", b"b").is_err());
        assert!(flip_cbc_plaintext(&mut ciphertext, 1, 10, b"0123456789", b"9876543210").is_err());
        assert!(flip_cbc_plaintext(&mut ciphertext, 3, 0, b"a", b"b").is_err());
    }
}
