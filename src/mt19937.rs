//! MT19937 pseudo-random number generator, its output tempering transform,
//! the exact inverse of that transform, and state cloning from observed
//! outputs.

pub const N: usize = 624;
const M: usize = 397;
const W: u32 = 32;
const UMASK: u32 = 0xffffffff << (W - 1);
const LMASK: u32 = 0xffffffff >> 1;
const A: u32 = 0x9908b0df;
const U: u32 = 11;
const S: u32 = 7;
const T: u32 = 15;
const L: u32 = 18;
const B: u32 = 0x9d2c5680;
const C: u32 = 0xefc60000;
const F: u32 = 1812433253;

/// A 32-bit Mersenne Twister.
///
/// The 624-word state fully determines all future outputs: two generators
/// holding the same state produce the same sequence, regardless of whether
/// that state was reached by seeding or by [`clone_from_outputs`].
///
/// Not safe for unsynchronised use across threads; `generate` is the only
/// mutator and callers must serialise access themselves.
pub struct Mt19937 {
    state: [u32; N],
    state_idx: usize,
}

impl Mt19937 {
    pub fn new(seed: u32) -> Self {
        Self {
            state: Self::seed_state(seed),
            state_idx: 0,
        }
    }

    /// Build a generator from a raw (untempered) state, with the rolling
    /// window positioned at the front of the array.
    pub fn from_state(state: [u32; N]) -> Self {
        Self {
            state,
            state_idx: 0,
        }
    }

    pub fn generate(&mut self) -> u32 {
        let k: usize = self.state_idx;
        let mut j: usize = k.checked_sub(N - 1).unwrap_or(k + 1);
        let x: u32 = (self.state[k] & UMASK) | (self.state[j] & LMASK);
        let mut x_a: u32 = x >> 1;
        if x & 1 > 0 {
            x_a ^= A;
        }
        j = k.checked_sub(N - M).unwrap_or(k + M);
        let next = self.state[j] ^ x_a;
        self.state[k] = next;
        self.state_idx = (k + 1) % N;
        temper(next)
    }

    /// Generate a u32 in the given range (inclusive).
    ///
    /// The span is held in 64 bits and the fraction never reaches 1, so the
    /// result stays in range for every input, `[0, u32::MAX]` included.
    pub fn generate_in_range(&mut self, min: u32, max: u32) -> u32 {
        let lo = min.min(max);
        let hi = min.max(max);
        let span = (hi - lo) as u64 + 1;
        lo + (span as f64 * self.generate_float()) as u32
    }

    /// Generate a float in range [0, 1).
    pub fn generate_float(&mut self) -> f64 {
        self.generate() as f64 / (u32::MAX as f64 + 1.0)
    }

    fn seed_state(mut seed: u32) -> [u32; N] {
        let mut state = [0; N];
        state[0] = seed;
        for (i, state_element) in state.iter_mut().enumerate().skip(1) {
            seed = F.wrapping_mul(seed ^ (seed >> (W - 2))).wrapping_add(i as u32);
            *state_element = seed;
        }
        state
    }
}

/// The output scrambling applied to a raw state word before it leaves the
/// generator. Each of the four XOR-shift-mask stages is bijective, so the
/// composition is too.
pub fn temper(x: u32) -> u32 {
    let mut y = x ^ (x >> U);
    y ^= (y << S) & B;
    y ^= (y << T) & C;
    y ^ (y >> L)
}

/// The exact left inverse of [`temper`]: `untemper(temper(x)) == x` for
/// every 32-bit x. Replays the forward stages in reverse order, re-deriving
/// each unknown bit group from bits already recovered.
pub fn untemper(value: u32) -> u32 {
    let mut v = invert_right_shift_xor(value, L);
    v = invert_left_shift_and_xor(v, T, C);
    v = invert_left_shift_and_xor(v, S, B);
    invert_right_shift_xor(v, U)
}

/// Reconstruct a generator from exactly 624 consecutive outputs of an
/// unknown-seed generator.
///
/// Each output is untempered and loaded positionally; the subsequent output
/// sequence is then identical to the source generator's, because the state
/// transition depends only on the state, never on the original seed.
///
/// Caller obligation: the outputs must be truly consecutive and unmodified.
/// A gap or altered value yields a generator whose future outputs silently
/// diverge from the source.
pub fn clone_from_outputs(outputs: &[u32; N]) -> Mt19937 {
    let mut state = [0u32; N];
    for (word, output) in state.iter_mut().zip(outputs.iter()) {
        *word = untemper(*output);
    }
    Mt19937::from_state(state)
}

// Here we're reversing the operation:
//      x = y ^ (y >> shift)
// The most significant 'shift' bits of x equal those of y, and each lower
// bit of y is x[i] ^ y[i - shift], computable once the bits above it are
// known.
fn invert_right_shift_xor(x: u32, shift: u32) -> u32 {
    let mut y = x;
    for i in (0..(32 - shift)).rev() {
        let recovered_bit = (y >> (i + shift)) & 1;
        y ^= recovered_bit << i;
    }
    y
}

// Here we're reversing the operation:
//      x = y ^ ((y << shift) & mask)
// The least significant 'shift' bits of x equal those of y; each higher bit
// follows from y[i] = x[i] ^ (y[i - shift] & mask[i]).
fn invert_left_shift_and_xor(x: u32, shift: u32, mask: u32) -> u32 {
    let mut y = x;
    for i in shift..32 {
        let recovered_bit = y >> (i - shift);
        let mask_bit = mask >> i;
        y ^= ((recovered_bit & mask_bit) & 1) << i;
    }
    y
}
