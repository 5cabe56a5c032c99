//! Distinguishing ECB from CBC through a chosen-plaintext oracle.

use crate::aes::{encrypt_aes_128_cbc, encrypt_aes_128_ecb, BLOCK_SIZE};
use crate::ecb_attacks::has_repeated_block;
use crate::util::{random_bytes, random_bytes_vec};

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ecb,
    Cbc,
}

/// An oracle that encrypts each payload under a fresh random key, in a mode
/// chosen uniformly at random per call, with 5 to 10 random bytes glued to
/// either end.
pub struct ModeOracle;

impl ModeOracle {
    /// Encrypt `payload`, returning the ciphertext together with the mode
    /// that was actually used (the ground truth for scoring a guess).
    pub fn encrypt(&mut self, payload: &[u8]) -> (Vec<u8>, Mode) {
        let mut rng = rand::thread_rng();
        let key = random_bytes::<BLOCK_SIZE>();
        let prefix = random_bytes_vec(rng.gen_range(5..=10));
        let suffix = random_bytes_vec(rng.gen_range(5..=10));
        let plaintext = [prefix.as_slice(), payload, &suffix].concat();
        if rng.gen_bool(0.5) {
            let iv = random_bytes::<BLOCK_SIZE>();
            (encrypt_aes_128_cbc(&plaintext, &key, &iv), Mode::Cbc)
        } else {
            (encrypt_aes_128_ecb(&plaintext, &key), Mode::Ecb)
        }
    }
}

/// The payload that makes the two modes distinguishable: enough identical
/// blocks that at least two of them stay block-aligned and intact despite
/// up to a block of unknown prefix.
pub fn distinguishing_payload() -> Vec<u8> {
    vec![b'A'; 3 * BLOCK_SIZE]
}

/// Classify a ciphertext produced from [`distinguishing_payload`].
///
/// ECB encrypts identical plaintext blocks to identical ciphertext blocks;
/// CBC's chaining destroys that. Any repeated block-aligned pair is
/// therefore called ECB. With random prefixes and suffixes in play this is
/// a statistical test, not an absolute one, which is why
/// [`measure_detection_accuracy`] reports an empirical rate instead of
/// assuming perfection.
pub fn guess_mode(ciphertext: &[u8]) -> Mode {
    if has_repeated_block(ciphertext) {
        Mode::Ecb
    } else {
        Mode::Cbc
    }
}

/// Run `trials` independent rounds against the oracle and report what
/// fraction of guesses matched the ground truth.
pub fn measure_detection_accuracy(oracle: &mut ModeOracle, trials: usize) -> f64 {
    if trials == 0 {
        return 0.0;
    }
    let payload = distinguishing_payload();
    let correct = (0..trials)
        .filter(|_| {
            let (ciphertext, actual) = oracle.encrypt(&payload);
            guess_mode(&ciphertext) == actual
        })
        .count();
    correct as f64 / trials as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::util::random_bytes;

    #[test]
    fn guess_mode_identifies_ecb_ciphertext() {
        let key = random_bytes::<16>();
        let ciphertext = encrypt_aes_128_ecb(&distinguishing_payload(), &key);

        assert_eq!(guess_mode(&ciphertext), Mode::Ecb);
    }

    #[test]
    fn guess_mode_identifies_cbc_ciphertext() {
        let key = random_bytes::<16>();
        let iv = random_bytes::<16>();
        let ciphertext = encrypt_aes_128_cbc(&distinguishing_payload(), &key, &iv);

        assert_eq!(guess_mode(&ciphertext), Mode::Cbc);
    }

    #[test]
    fn detection_accuracy_is_at_least_99_percent_over_1000_trials() {
        let mut oracle = ModeOracle;

        let accuracy = measure_detection_accuracy(&mut oracle, 1000);

        assert!(accuracy >= 0.99, "accuracy was only {accuracy}");
    }
}
