//! XOR combinators and brute-force breaks for single-byte and
//! repeating-key XOR ciphers.

use std::ops::Range;

use rayon::prelude::*;

pub fn xor_bytes(buf_a: &[u8], buf_b: &[u8]) -> Result<Vec<u8>, String> {
    if buf_a.len() != buf_b.len() {
        return Err("Buffers are not of equal length".to_string());
    }
    Ok(buf_a.iter().zip(buf_b.iter()).map(|(a, b)| a ^ b).collect())
}

pub fn xor_with_key(bytes: &[u8], key: u8) -> Vec<u8> {
    bytes.iter().map(|b| b ^ key).collect()
}

/// XOR `bytes` against `key` repeated cyclically. Self-inverse, like every
/// XOR cipher here.
pub fn xor_with_repeating_key(bytes: &[u8], key: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .zip(key.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

/// The number of bit positions at which `a` and `b` differ.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}

pub struct XorCrackResult {
    pub key: u8,
    pub message: Vec<u8>,
    pub score: f64,
}

/// Brute force a single-byte XOR cipher.
///
/// Tries all 256 keys and keeps the candidate plaintext with the lowest
/// score. The scorer is supplied by the caller; lower means "more plausible
/// natural-language text".
pub fn brute_force_byte_xor<F>(bytes: &[u8], score: F) -> XorCrackResult
where
    F: Fn(&[u8]) -> f64 + Sync,
{
    let (score, key, message) = (0..=255u8)
        .into_par_iter()
        .map(|key| {
            let decrypted = xor_with_key(bytes, key);
            let score = score(&decrypted);
            (score, key, decrypted)
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .expect("the key space is never empty");
    XorCrackResult {
        key,
        message,
        score,
    }
}

pub struct RepeatingXorCrackResult {
    pub key: Vec<u8>,
    pub message: Vec<u8>,
    pub score: f64,
}

/// Brute force a repeating-key XOR cipher.
///
/// Candidate key sizes are ranked by the normalised Hamming distance
/// between consecutive key-sized ciphertext blocks: at the right size the
/// compared bytes were XOR-ed with the same key byte, so the key cancels
/// and the distance drops to that of the plaintext itself. For each of the
/// three best-ranked sizes the ciphertext is transposed into columns of
/// bytes sharing one key byte, each column is broken as a single-byte XOR
/// cipher, and the full decryption with the lowest score wins.
///
/// A multiple of the true key size ranks just as well as the size itself,
/// so the returned key may be the real one repeated; the message is the
/// same either way.
///
/// Panics when no size in `key_sizes` fits twice into the ciphertext.
pub fn brute_force_repeating_xor<F>(
    bytes: &[u8],
    key_sizes: Range<usize>,
    score: F,
) -> RepeatingXorCrackResult
where
    F: Fn(&[u8]) -> f64 + Sync,
{
    let mut ranked: Vec<(f64, usize)> = key_sizes
        .filter(|&key_size| key_size >= 1 && 2 * key_size <= bytes.len())
        .map(|key_size| (normalised_block_distance(bytes, key_size), key_size))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    ranked
        .iter()
        .take(3)
        .map(|&(_, key_size)| {
            let key: Vec<u8> = (0..key_size)
                .map(|offset| {
                    let column: Vec<u8> = bytes
                        .iter()
                        .skip(offset)
                        .step_by(key_size)
                        .copied()
                        .collect();
                    brute_force_byte_xor(&column, &score).key
                })
                .collect();
            let message = xor_with_repeating_key(bytes, &key);
            let score = score(&message);
            RepeatingXorCrackResult {
                key,
                message,
                score,
            }
        })
        .min_by(|a, b| a.score.total_cmp(&b.score))
        .expect("no candidate key size fits the ciphertext twice")
}

fn normalised_block_distance(bytes: &[u8], key_size: usize) -> f64 {
    let n_pairs = 8;
    let blocks = bytes.chunks_exact(key_size);
    let shifted = bytes.chunks_exact(key_size).skip(1);
    let distances: Vec<u32> = blocks
        .zip(shifted)
        .take(n_pairs)
        .map(|(a, b)| hamming_distance(a, b))
        .collect();
    distances.iter().sum::<u32>() as f64 / distances.len() as f64 / key_size as f64
}
