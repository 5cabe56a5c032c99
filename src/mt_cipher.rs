//! A symmetric XOR stream cipher keyed by an MT19937 seed.

use crate::mt19937::Mt19937;

/// XOR `payload` against the keystream of little-endian bytes of successive
/// generator outputs, truncated to the payload length.
///
/// XOR is self-inverse and the keystream depends only on the seed, so
/// `crypt(crypt(m, seed), seed) == m` for every message and seed.
pub fn crypt(payload: &[u8], seed: u32) -> Vec<u8> {
    let mut rng = Mt19937::new(seed);
    let mut key_buf = [0u8; 4];
    payload
        .iter()
        .enumerate()
        .map(|(i, byte)| {
            let idx = i % 4;
            if idx == 0 {
                key_buf = rng.generate().to_le_bytes();
            }
            byte ^ key_buf[idx]
        })
        .collect()
}

/// Brute force the seed of an MT19937-keystream ciphertext.
///
/// Each candidate seed is used for a trial decryption; the first whose
/// plaintext satisfies `plaintext_identifier` (e.g. "ends with our known
/// suffix") wins. Returns `None` when the candidate space is exhausted.
pub fn recover_cipher_seed<F>(
    ciphertext: &[u8],
    candidates: impl IntoIterator<Item = u32>,
    plaintext_identifier: F,
) -> Option<u32>
where
    F: Fn(&[u8]) -> bool,
{
    candidates
        .into_iter()
        .find(|&seed| plaintext_identifier(&crypt(ciphertext, seed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::util::random_bytes_vec;

    #[test]
    fn crypt_is_an_involution() {
        let message = b"Attack at dawn. Bring 624 consecutive outputs.".to_vec();
        let seed = 3_133_731_337;

        let ciphertext = crypt(&message, seed);
        let decrypted = crypt(&ciphertext, seed);

        assert_ne!(message, ciphertext);
        assert_eq!(message, decrypted);
    }

    #[test]
    fn crypt_truncates_keystream_to_payload_length() {
        // 5 bytes consumes one output fully and one partially.
        let ciphertext = crypt(b"hello", 1234);

        assert_eq!(ciphertext.len(), 5);
    }

    #[test]
    fn recover_cipher_seed_finds_16_bit_seed_from_known_suffix() {
        let known_suffix = b"A".repeat(14);
        let message = [random_bytes_vec(37), known_suffix.clone()].concat();
        let seed: u32 = 59135;
        let ciphertext = crypt(&message, seed);

        let recovered = recover_cipher_seed(&ciphertext, 0..=u16::MAX as u32, |candidate| {
            candidate.ends_with(&known_suffix)
        });

        assert_eq!(recovered, Some(seed));
    }

    #[test]
    fn recover_cipher_seed_returns_none_when_exhausted() {
        let ciphertext = crypt(b"no suffix here", 70_000);

        let recovered =
            recover_cipher_seed(&ciphertext, 0..1000, |candidate| candidate.ends_with(b"AAAA"));

        assert_eq!(recovered, None);
    }
}
