//! ECB and CBC composition over the AES-128 block primitive.
//!
//! The block cipher itself comes from the `aes` crate; this module owns only
//! the chaining, XOR and padding around it.

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;

use crate::pkcs7;
use crate::xor::xor_bytes;

pub const BLOCK_SIZE: usize = 16;

pub fn encrypt_aes_128_ecb(plaintext: &[u8], key: &[u8; BLOCK_SIZE]) -> Vec<u8> {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let padded = pkcs7::pad(plaintext, BLOCK_SIZE as u8);
    let mut ciphertext = Vec::with_capacity(padded.len());
    for chunk in padded.chunks(BLOCK_SIZE) {
        let mut block = GenericArray::clone_from_slice(chunk);
        cipher.encrypt_block(&mut block);
        ciphertext.extend_from_slice(&block);
    }
    ciphertext
}

pub fn decrypt_aes_128_ecb(ciphertext: &[u8], key: &[u8; BLOCK_SIZE]) -> Result<Vec<u8>, String> {
    check_block_aligned(ciphertext)?;
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut plaintext = Vec::with_capacity(ciphertext.len());
    for chunk in ciphertext.chunks(BLOCK_SIZE) {
        let mut block = GenericArray::clone_from_slice(chunk);
        cipher.decrypt_block(&mut block);
        plaintext.extend_from_slice(&block);
    }
    pkcs7::unpad(&plaintext, BLOCK_SIZE as u8)
}

pub fn encrypt_aes_128_cbc(
    plaintext: &[u8],
    key: &[u8; BLOCK_SIZE],
    iv: &[u8; BLOCK_SIZE],
) -> Vec<u8> {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let padded = pkcs7::pad(plaintext, BLOCK_SIZE as u8);
    let mut ciphertext = Vec::with_capacity(padded.len());
    let mut last_block = iv.to_vec();
    for chunk in padded.chunks(BLOCK_SIZE) {
        let chained = xor_bytes(chunk, &last_block).expect("blocks have equal length");
        let mut block = GenericArray::clone_from_slice(&chained);
        cipher.encrypt_block(&mut block);
        ciphertext.extend_from_slice(&block);
        last_block = block.to_vec();
    }
    ciphertext
}

pub fn decrypt_aes_128_cbc(
    ciphertext: &[u8],
    key: &[u8; BLOCK_SIZE],
    iv: &[u8; BLOCK_SIZE],
) -> Result<Vec<u8>, String> {
    let plaintext = decrypt_aes_128_cbc_raw(ciphertext, key, iv)?;
    pkcs7::unpad(&plaintext, BLOCK_SIZE as u8)
}

/// CBC decryption without padding removal. The padding-validity oracle needs
/// the raw plaintext to apply the validity rule itself.
pub fn decrypt_aes_128_cbc_raw(
    ciphertext: &[u8],
    key: &[u8; BLOCK_SIZE],
    iv: &[u8; BLOCK_SIZE],
) -> Result<Vec<u8>, String> {
    check_block_aligned(ciphertext)?;
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut plaintext = Vec::with_capacity(ciphertext.len());
    let mut last_block: &[u8] = iv;
    for chunk in ciphertext.chunks(BLOCK_SIZE) {
        let mut block = GenericArray::clone_from_slice(chunk);
        cipher.decrypt_block(&mut block);
        plaintext.extend_from_slice(&xor_bytes(&block, last_block)?);
        last_block = chunk;
    }
    Ok(plaintext)
}

fn check_block_aligned(ciphertext: &[u8]) -> Result<(), String> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(format!(
            "ciphertext length {} is not a positive multiple of the block size {BLOCK_SIZE}",
            ciphertext.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::util::random_bytes;

    #[test]
    fn ecb_decrypt_inverts_encrypt() {
        let key = random_bytes::<16>();
        let message = b"Two One Nine Two, and a bit more than one block";

        let ciphertext = encrypt_aes_128_ecb(message, &key);
        let plaintext = decrypt_aes_128_ecb(&ciphertext, &key).unwrap();

        assert_eq!(plaintext, message);
    }

    #[test]
    fn ecb_encrypts_identical_blocks_identically() {
        let key = random_bytes::<16>();
        let message = [b"YELLOW SUBMARINE".to_vec(), b"YELLOW SUBMARINE".to_vec()].concat();

        let ciphertext = encrypt_aes_128_ecb(&message, &key);

        assert_eq!(ciphertext[..16], ciphertext[16..32]);
    }

    #[test]
    fn cbc_decrypt_inverts_encrypt() {
        let key = random_bytes::<16>();
        let iv = random_bytes::<16>();
        let message = b"I'm back and I'm ringin' the bell";

        let ciphertext = encrypt_aes_128_cbc(message, &key, &iv);
        let plaintext = decrypt_aes_128_cbc(&ciphertext, &key, &iv).unwrap();

        assert_eq!(plaintext, message);
    }

    #[test]
    fn cbc_does_not_encrypt_identical_blocks_identically() {
        let key = random_bytes::<16>();
        let iv = random_bytes::<16>();
        let message = [b"YELLOW SUBMARINE".to_vec(), b"YELLOW SUBMARINE".to_vec()].concat();

        let ciphertext = encrypt_aes_128_cbc(&message, &key, &iv);

        assert_ne!(ciphertext[..16], ciphertext[16..32]);
    }

    #[test]
    fn decrypt_rejects_non_block_aligned_ciphertext() {
        let key = random_bytes::<16>();
        let iv = random_bytes::<16>();

        assert!(decrypt_aes_128_ecb(&[0u8; 17], &key).is_err());
        assert!(decrypt_aes_128_cbc(&[0u8; 17], &key, &iv).is_err());
        assert!(decrypt_aes_128_cbc_raw(&[], &key, &iv).is_err());
    }

    #[test]
    fn decrypt_reports_corrupted_padding() {
        let key = random_bytes::<16>();
        let mut ciphertext = encrypt_aes_128_ecb(b"sixteen byte msg", &key);
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xFF;

        // Corrupting the final block scrambles the padding; a scrambled
        // block can still end in coincidentally valid padding, but it can
        // never round-trip back to the original message.
        let decrypted = decrypt_aes_128_ecb(&ciphertext, &key);
        assert_ne!(decrypted.ok(), Some(b"sixteen byte msg".to_vec()));
    }
}
