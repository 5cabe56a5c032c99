//! PKCS#7 byte-count padding: append k bytes of value k.

/// Pad `bytes` up to a multiple of `block_size`. Always appends at least one
/// byte: a message already on a block boundary gains a full padding block.
pub fn pad(bytes: &[u8], block_size: u8) -> Vec<u8> {
    let n_pad = block_size - (bytes.len() % block_size as usize) as u8;
    let mut out = Vec::with_capacity(bytes.len() + n_pad as usize);
    out.extend_from_slice(bytes);
    (0..n_pad).for_each(|_| out.push(n_pad));
    out
}

/// Strip and validate padding. Rejects empty input, input not a multiple of
/// the block size, a padding count outside [1, block_size], and any
/// mismatched trailing byte.
pub fn unpad(bytes: &[u8], block_size: u8) -> Result<Vec<u8>, String> {
    if bytes.is_empty() || bytes.len() % block_size as usize != 0 {
        return Err(format!(
            "invalid input length {} for block size {block_size}",
            bytes.len()
        ));
    }
    let n_pad = *bytes.last().expect("input checked non-empty");
    if n_pad == 0 || n_pad > block_size {
        return Err(format!(
            "padding count {n_pad} out of range for block size {block_size}"
        ));
    }
    let pad_start = bytes.len() - n_pad as usize;
    if bytes[pad_start..].iter().any(|&b| b != n_pad) {
        return Err("mismatched trailing padding byte".to_string());
    }
    Ok(bytes[..pad_start].to_vec())
}

/// The validity rule of [`unpad`] without the copy.
pub fn is_valid(bytes: &[u8], block_size: u8) -> bool {
    unpad(bytes, block_size).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case("YELL", 4, "YELL\x04\x04\x04\x04")]
    #[case("YELLOWS!!!", 6, "YELLOWS!!!\x02\x02")]
    #[case("YELLOW SUBMARINE", 20, "YELLOW SUBMARINE\x04\x04\x04\x04")]
    fn pad_appends_byte_count_padding(
        #[case] msg: &str,
        #[case] block_size: u8,
        #[case] expected: &str,
    ) {
        let padded = pad(msg.as_bytes(), block_size);

        assert_eq!(padded, expected.as_bytes());
    }

    #[test]
    fn unpad_strips_valid_padding() {
        let unpadded = unpad(b"ICE ICE BABY\x04\x04\x04\x04", 16);

        assert_eq!(unpadded.unwrap(), b"ICE ICE BABY");
    }

    #[rstest]
    #[case(&[])]
    #[case(b"ICE ICE BABY\x05\x05\x05\x05")]
    #[case(b"ICE ICE BABY\x01\x02\x03\x04")]
    #[case(b"ICE ICE BABY\x00\x00\x00\x00")]
    #[case(b"not block aligned\x01")]
    fn unpad_rejects_invalid_padding(#[case] padded: &[u8]) {
        assert!(unpad(padded, 16).is_err());
        assert!(!is_valid(padded, 16));
    }

    #[rstest]
    #[case(1)]
    #[case(4)]
    #[case(16)]
    #[case(255)]
    fn unpad_inverts_pad_for_every_block_size(#[case] block_size: u8) {
        let messages: [&[u8]; 4] = [b"", b"a", b"YELLOW SUBMARINE", b"0123456789abcdefg"];
        for msg in messages {
            let padded = pad(msg, block_size);

            assert_eq!(padded.len() % block_size as usize, 0);
            assert_eq!(unpad(&padded, block_size).unwrap(), msg);
        }
    }
}
