//! Chosen-plaintext attacks against ECB encryption oracles.
//!
//! The suffix-recovery oracle computes `ECB(prefix ++ payload ++ secret)`
//! under a fixed unknown key. Whether the prefix is absent, drawn once, or
//! re-drawn on every call is an explicit configuration choice
//! ([`PrefixPolicy`]); the deterministic codebook attack handles the first
//! two, the probabilistic repeated-block attack handles the third.
//!
//! The cut-and-paste forgery targets a different oracle, one that encrypts
//! an attacker-influenced `key=value` profile, and exploits ECB's
//! block-independence directly: blocks cut from one ciphertext stay valid
//! when pasted into another.

use std::collections::HashMap;

use crate::aes::{decrypt_aes_128_ecb, encrypt_aes_128_ecb, BLOCK_SIZE};
use crate::mt19937::Mt19937;
use crate::pkcs7;

/// How an [`EcbSuffixOracle`] manages the bytes it prepends to each payload.
pub enum PrefixPolicy {
    /// Payloads are encrypted as `payload ++ secret`.
    None,
    /// A random prefix of the given length, drawn once at construction and
    /// reused for every call.
    FixedRandom { len: usize },
    /// A fresh random prefix of length in `[0, max_len]`, re-drawn on every
    /// call. Defeats exact alignment and forces the probabilistic attack.
    FreshPerCall { max_len: usize },
}

/// An encryption oracle holding a fixed key and a fixed secret suffix.
///
/// The key and secret never change for the lifetime of the oracle, which is
/// the invariant every attack below relies on.
pub struct EcbSuffixOracle {
    key: [u8; BLOCK_SIZE],
    secret: Vec<u8>,
    policy: PrefixPolicy,
    fixed_prefix: Vec<u8>,
    rng: Mt19937,
}

impl EcbSuffixOracle {
    pub fn new(key: [u8; BLOCK_SIZE], secret: Vec<u8>, policy: PrefixPolicy, rng_seed: u32) -> Self {
        let mut rng = Mt19937::new(rng_seed);
        let fixed_prefix = match policy {
            PrefixPolicy::FixedRandom { len } => random_byte_vec(&mut rng, len),
            _ => Vec::new(),
        };
        Self {
            key,
            secret,
            policy,
            fixed_prefix,
            rng,
        }
    }

    pub fn encrypt(&mut self, payload: &[u8]) -> Vec<u8> {
        let prefix = match self.policy {
            PrefixPolicy::None => Vec::new(),
            PrefixPolicy::FixedRandom { .. } => self.fixed_prefix.clone(),
            PrefixPolicy::FreshPerCall { max_len } => {
                let len = self.rng.generate_in_range(0, max_len as u32) as usize;
                random_byte_vec(&mut self.rng, len)
            }
        };
        let plaintext = [prefix.as_slice(), payload, &self.secret].concat();
        encrypt_aes_128_ecb(&plaintext, &self.key)
    }

    fn regenerates_prefix(&self) -> bool {
        matches!(self.policy, PrefixPolicy::FreshPerCall { .. })
    }
}

fn random_byte_vec(rng: &mut Mt19937, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.generate() as u8).collect()
}

/// Recover the oracle's secret suffix with the deterministic codebook
/// attack.
///
/// Block size and secret length are determined by watching the ciphertext
/// length grow as filler bytes are appended. Then, for each secret byte
/// position, filler aligns the target byte to the end of a block, all 256
/// candidate bytes are encrypted into a codebook keyed by the resulting
/// block, and the real ciphertext block is looked up.
///
/// Errors on a `FreshPerCall` oracle (use
/// [`recover_ecb_secret_random_prefix`]), on an unexpected block size, and
/// on a codebook miss.
pub fn recover_ecb_secret(oracle: &mut EcbSuffixOracle) -> Result<Vec<u8>, String> {
    if oracle.regenerates_prefix() {
        return Err(
            "oracle re-randomises its prefix per call; the codebook attack requires a stable \
             alignment"
                .to_string(),
        );
    }

    let block_size = detect_block_size(oracle);
    if block_size != BLOCK_SIZE {
        return Err(format!("unsupported block size '{block_size}' detected"));
    }

    let prefix_len = if matches!(oracle.policy, PrefixPolicy::None) {
        0
    } else {
        find_fixed_prefix_len(oracle)
            .ok_or_else(|| "could not locate the oracle's fixed prefix boundary".to_string())?
    };

    // The first ciphertext growth tells us how many padding bytes the empty
    // payload leaves, and with it the exact secret length.
    let base_len = oracle.encrypt(&[]).len();
    let mut n_padding = 1;
    while oracle.encrypt(&vec![b'A'; n_padding]).len() == base_len {
        n_padding += 1;
    }
    let secret_len = base_len - n_padding - prefix_len;

    let mut recovered: Vec<u8> = Vec::with_capacity(secret_len);
    for position in 0..secret_len {
        let byte = crack_byte_with_codebook(oracle, prefix_len, &recovered)
            .ok_or_else(|| format!("no codebook entry matched secret byte {position}"))?;
        recovered.push(byte);
    }
    Ok(recovered)
}

fn crack_byte_with_codebook(
    oracle: &mut EcbSuffixOracle,
    prefix_len: usize,
    recovered: &[u8],
) -> Option<u8> {
    // Filler so the next unknown byte lands on the last byte of a block;
    // that block then contains only bytes we already know plus the target.
    let filler_len = (BLOCK_SIZE - (prefix_len + recovered.len() + 1) % BLOCK_SIZE) % BLOCK_SIZE;
    let filler = vec![b'A'; filler_len];
    let target_start = prefix_len + filler_len + recovered.len() + 1 - BLOCK_SIZE;

    // Each probe reproduces the real query's layout exactly, with the
    // candidate byte sitting where the next secret byte would: the oracle's
    // own prefix provides the alignment, so the same block index is
    // comparable across probes and the real query.
    let mut codebook: HashMap<[u8; BLOCK_SIZE], u8> = HashMap::with_capacity(256);
    for candidate in 0..=255u8 {
        let probe = [filler.as_slice(), recovered, &[candidate]].concat();
        let ciphertext = oracle.encrypt(&probe);
        let block: [u8; BLOCK_SIZE] = ciphertext[target_start..target_start + BLOCK_SIZE]
            .try_into()
            .expect("ciphertext is block aligned");
        codebook.insert(block, candidate);
    }

    let real = oracle.encrypt(&filler);
    let target: [u8; BLOCK_SIZE] = real[target_start..target_start + BLOCK_SIZE]
        .try_into()
        .expect("ciphertext is block aligned");
    codebook.get(&target).copied()
}

/// Recover the secret suffix of an oracle that re-randomises its prefix on
/// every call.
///
/// Exact alignment cannot be guaranteed per call, so the attack is
/// probabilistic: a guessed block only collides with the matching secret
/// block when the fresh prefix happens to be a multiple of the block size.
/// A candidate byte is accepted once that collision has been observed on
/// more than `confirmations` independent calls, which suppresses false
/// positives from incidental block collisions. Each byte is bounded by
/// `max_rounds` sweeps over the 256 candidates; exhausting the bound is an
/// error, never a silent retry.
///
/// Recovery stops when the accepted byte is 0x01: with the secret fully
/// consumed, the "next byte" is the first PKCS#7 padding byte.
pub fn recover_ecb_secret_random_prefix(
    oracle: &mut EcbSuffixOracle,
    confirmations: u32,
    max_rounds: usize,
) -> Result<Vec<u8>, String> {
    let secret_bound = oracle.encrypt(&[]).len();
    let mut recovered: Vec<u8> = Vec::new();
    for _ in 0..secret_bound {
        let byte = guess_byte_by_repetition(oracle, &recovered, confirmations, max_rounds)?;
        if byte == 0x01 {
            return Ok(recovered);
        }
        recovered.push(byte);
    }
    Err("ran past the maximum possible secret length without hitting padding".to_string())
}

fn guess_byte_by_repetition(
    oracle: &mut EcbSuffixOracle,
    recovered: &[u8],
    confirmations: u32,
    max_rounds: usize,
) -> Result<u8, String> {
    let next_len = recovered.len() + 1;
    let filler_len = (BLOCK_SIZE - next_len % BLOCK_SIZE) % BLOCK_SIZE;
    let filler = vec![0u8; filler_len];

    // The block a correct guess duplicates: the 15 bytes of filler/recovered
    // text that precede the target byte, plus the candidate itself. The
    // trailing filler aligns the secret so the genuine copy of that block
    // sits on a block boundary whenever the call's random prefix does.
    let guessed = [filler.as_slice(), recovered, &[0u8]].concat();
    let mut payload = [&guessed[guessed.len() - BLOCK_SIZE..], filler.as_slice()].concat();

    let mut observations = [0u32; 256];
    for _ in 0..max_rounds {
        for candidate in 0..=255u8 {
            payload[BLOCK_SIZE - 1] = candidate;
            if has_repeated_block(&oracle.encrypt(&payload)) {
                observations[candidate as usize] += 1;
                if observations[candidate as usize] > confirmations {
                    return Ok(candidate);
                }
            }
        }
    }
    Err(format!(
        "no candidate for secret byte {} was confirmed within {max_rounds} rounds",
        recovered.len()
    ))
}

/// Whether any two block-aligned 16-byte blocks are identical.
pub fn has_repeated_block(bytes: &[u8]) -> bool {
    let blocks: Vec<&[u8]> = bytes.chunks(BLOCK_SIZE).collect();
    for (i, block) in blocks.iter().enumerate() {
        if blocks[i + 1..].contains(block) {
            return true;
        }
    }
    false
}

/// Detect the oracle's block size from the first jump in ciphertext length
/// as the payload grows.
pub fn detect_block_size(oracle: &mut EcbSuffixOracle) -> usize {
    let initial_len = oracle.encrypt(&[]).len();
    let mut input = vec![b'A'];
    let mut ciphertext_len = oracle.encrypt(&input).len();
    while initial_len == ciphertext_len {
        input.push(b'A');
        ciphertext_len = oracle.encrypt(&input).len();
    }
    ciphertext_len - initial_len
}

/// Locate the byte length of a fixed oracle prefix.
///
/// The first ciphertext block that differs between two single-byte payloads
/// is the block the prefix ends in. Growing a run of filler bytes until two
/// consecutive identical ciphertext blocks appear then pins down the offset
/// within that block: with `slack` filler bytes absorbed, the prefix ends
/// `slack` bytes short of a block boundary.
///
/// The probe is run with two different filler bytes and the results must
/// agree; a prefix whose trailing bytes coincide with one filler value
/// cannot also coincide with the other, so a coincidence yields `None`
/// rather than a wrong length.
pub fn find_fixed_prefix_len(oracle: &mut EcbSuffixOracle) -> Option<usize> {
    let c1 = oracle.encrypt(b"0");
    let c2 = oracle.encrypt(b"1");
    let first_payload_block = c1
        .chunks(BLOCK_SIZE)
        .zip(c2.chunks(BLOCK_SIZE))
        .position(|(b1, b2)| b1 != b2)?;

    for slack in 0..BLOCK_SIZE {
        let probe_a = oracle.encrypt(&vec![b'0'; 2 * BLOCK_SIZE + slack]);
        let probe_b = oracle.encrypt(&vec![b'1'; 2 * BLOCK_SIZE + slack]);
        let repeat_a = first_consecutive_repeat(&probe_a, first_payload_block);
        let repeat_b = first_consecutive_repeat(&probe_b, first_payload_block);
        if let (Some(j), Some(j_check)) = (repeat_a, repeat_b) {
            if j == j_check {
                return (j * BLOCK_SIZE).checked_sub(slack);
            }
        }
    }

    // Unreachable for a genuine fixed-prefix ECB oracle.
    None
}

fn first_consecutive_repeat(ciphertext: &[u8], from_block: usize) -> Option<usize> {
    let blocks: Vec<&[u8]> = ciphertext.chunks(BLOCK_SIZE).collect();
    (from_block..blocks.len().saturating_sub(1)).find(|&j| blocks[j] == blocks[j + 1])
}

/// A decoded `email=...&uid=...&role=...` profile.
#[derive(Debug, PartialEq, Eq)]
pub struct Profile {
    pub email: String,
    pub uid: u32,
    pub role: String,
}

/// Encrypts the encoded profile for a caller-supplied email address under a
/// fixed key; every new account gets role "user".
pub struct ProfileOracle {
    key: [u8; BLOCK_SIZE],
}

impl ProfileOracle {
    pub fn new(key: [u8; BLOCK_SIZE]) -> Self {
        Self { key }
    }

    /// Encrypt the encoded profile for `email`.
    ///
    /// The field metacharacters `&` and `=` are rejected outright, so a
    /// caller cannot inject an extra `role=admin` pair through the email.
    pub fn profile_for(&self, email: &[u8]) -> Result<Vec<u8>, String> {
        if email.iter().any(|&b| b == b'&' || b == b'=') {
            return Err("email must not contain '&' or '='".to_string());
        }
        let encoded = [b"email=".as_slice(), email, b"&uid=10&role=user"].concat();
        Ok(encrypt_aes_128_ecb(&encoded, &self.key))
    }

    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Profile, String> {
        let encoded = decrypt_aes_128_ecb(ciphertext, &self.key)?;
        parse_profile(&encoded)
    }
}

fn parse_profile(encoded: &[u8]) -> Result<Profile, String> {
    let text = std::str::from_utf8(encoded)
        .map_err(|e| format!("profile encoding is not valid UTF-8: {e}"))?;
    let mut fields: HashMap<&str, &str> = HashMap::new();
    for pair in text.split('&') {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("'{pair}' is not a key=value pair"))?;
        fields.insert(key, value);
    }
    let field = |name: &str| {
        fields
            .get(name)
            .copied()
            .ok_or_else(|| format!("profile is missing the '{name}' field"))
    };
    Ok(Profile {
        email: field("email")?.to_string(),
        uid: field("uid")?
            .parse()
            .map_err(|e| format!("uid is not a number: {e}"))?,
        role: field("role")?.to_string(),
    })
}

/// Forge a ciphertext that decrypts to a profile with role "admin", using
/// only the encryption oracle.
///
/// One query places a pkcs7-padded "admin" on its own block boundary inside
/// the email; a second sizes the email so the role value sits alone on the
/// final block. Splicing the former block onto the latter ciphertext swaps
/// the role, and the pad bytes carried inside the cut block double as the
/// forged ciphertext's own padding.
pub fn forge_admin_profile(oracle: &ProfileOracle) -> Result<Vec<u8>, String> {
    // "email=" is 6 bytes, so 10 filler bytes push the padded "admin" onto
    // the second block.
    let cut_email = [
        b"AAAAAAAAAA".as_slice(),
        &pkcs7::pad(b"admin", BLOCK_SIZE as u8),
    ]
    .concat();
    let cut = oracle.profile_for(&cut_email)?;

    // A 13-byte email makes "email=" ++ email ++ "&uid=10&role=" exactly
    // two blocks, leaving the role value alone on the last one.
    let paste = oracle.profile_for(b"foooo@bar.com")?;

    Ok([&paste[..2 * BLOCK_SIZE], &cut[BLOCK_SIZE..2 * BLOCK_SIZE]].concat())
}
