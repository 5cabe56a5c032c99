mod aes;
mod cbc_attacks;
mod ecb_attacks;
mod english;
mod mode_detect;
mod mt19937;
mod mt_cipher;
mod padding_oracle;
mod pkcs7;
mod seed_search;
mod util;
mod xor;

pub use aes::{
    decrypt_aes_128_cbc, decrypt_aes_128_cbc_raw, decrypt_aes_128_ecb, encrypt_aes_128_cbc,
    encrypt_aes_128_ecb, BLOCK_SIZE,
};
pub use cbc_attacks::{flip_cbc_plaintext, forge_admin_cookie, CookieOracle};
pub use ecb_attacks::{
    detect_block_size, find_fixed_prefix_len, forge_admin_profile, has_repeated_block,
    recover_ecb_secret, recover_ecb_secret_random_prefix, EcbSuffixOracle, PrefixPolicy, Profile,
    ProfileOracle,
};
pub use english::FrequencyModel;
pub use mode_detect::{
    distinguishing_payload, guess_mode, measure_detection_accuracy, Mode, ModeOracle,
};
pub use mt19937::{clone_from_outputs, temper, untemper, Mt19937, N};
pub use mt_cipher::{crypt, recover_cipher_seed};
pub use padding_oracle::PaddingValidityOracle;
pub use pkcs7::{is_valid as is_valid_pkcs7, pad as pkcs7_pad, unpad as pkcs7_unpad};
pub use seed_search::{find_seed, find_timestamp_seed};
pub use util::{random_bytes, random_bytes_vec};
pub use xor::{
    brute_force_byte_xor, brute_force_repeating_xor, hamming_distance, xor_bytes, xor_with_key,
    xor_with_repeating_key, RepeatingXorCrackResult, XorCrackResult,
};
