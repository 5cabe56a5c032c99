//! Byte-histogram "English-likeness" scoring.
//!
//! The model is an immutable value built from a reference paragraph and
//! passed explicitly to whatever consumes it; there is no shared global
//! state.

const REFERENCE_TEXT: &[u8] = b"This is a different way to learn about crypto than taking \
a class or reading a book. We give you problems to solve. They're derived from weaknesses \
in real-world systems and modern cryptographic constructions. We give you enough info to \
learn about the underlying crypto concepts yourself. When you're finished, you'll not \
only have learned a good deal about how cryptosystems are built, but you'll also \
understand how they're attacked.";

/// Relative frequency of each byte value in a reference corpus.
pub struct FrequencyModel {
    frequencies: [f64; 256],
}

impl FrequencyModel {
    /// A model trained on a paragraph of ordinary English prose.
    pub fn english() -> Self {
        Self::from_corpus(REFERENCE_TEXT)
    }

    pub fn from_corpus(corpus: &[u8]) -> Self {
        Self {
            frequencies: byte_frequencies(corpus),
        }
    }

    /// Euclidean distance between the candidate's byte histogram and the
    /// model's. Lower means "more plausible natural-language text".
    pub fn score(&self, candidate: &[u8]) -> f64 {
        let observed = byte_frequencies(candidate);
        self.frequencies
            .iter()
            .zip(observed.iter())
            .map(|(model, obs)| (model - obs).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

fn byte_frequencies(bytes: &[u8]) -> [f64; 256] {
    let mut counts = [0u64; 256];
    for &b in bytes {
        counts[b as usize] += 1;
    }
    let total = bytes.len().max(1) as f64;
    let mut frequencies = [0f64; 256];
    for (freq, count) in frequencies.iter_mut().zip(counts.iter()) {
        *freq = *count as f64 / total;
    }
    frequencies
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::xor::xor_with_key;

    #[test]
    fn english_text_scores_lower_than_garbled_bytes() {
        let model = FrequencyModel::english();
        let plaintext = b"Burning 'em, if you ain't quick and nimble";
        let garbled = xor_with_key(plaintext, 0xE3);

        assert!(model.score(plaintext) < model.score(&garbled));
    }

    #[test]
    fn lowercase_text_scores_lower_than_its_case_flipped_twin() {
        // XOR key candidates differing only in bit 5 produce case-swapped
        // plaintexts; the model must separate them.
        let model = FrequencyModel::english();
        let lowercase = b"such a subtle difference in the histogram";
        let uppercase = b"SUCH A SUBTLE DIFFERENCE IN THE HISTOGRAM";

        assert!(model.score(lowercase) < model.score(uppercase));
    }

    #[test]
    fn score_of_the_corpus_itself_is_zero() {
        let model = FrequencyModel::from_corpus(b"abcabc");

        assert!(model.score(b"abcabc") < 1e-12);
        assert!(model.score(b"abc") < 1e-12);
    }
}
