use rand::RngCore;

pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

pub fn random_bytes_vec(n: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; n];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_bytes_generates_different_bytes() {
        let key_1 = random_bytes::<16>();
        let key_2 = random_bytes::<16>();

        assert_ne!(key_1, key_2);
    }

    #[test]
    fn random_bytes_vec_has_requested_length() {
        assert_eq!(random_bytes_vec(42).len(), 42);
        assert!(random_bytes_vec(0).is_empty());
    }
}
