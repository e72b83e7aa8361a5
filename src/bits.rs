//! Byte/bit conversion shared by the translator, RS wrapper, and the
//! image packbits module. Bits are MSB-first within each byte.

/// Pack a bit vector into bytes, zero-padding the final byte if needed.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            let mut byte = 0u8;
            for (i, &bit) in chunk.iter().enumerate() {
                if bit {
                    byte |= 1 << (7 - i);
                }
            }
            byte
        })
        .collect()
}

/// Unpack bytes into a bit vector of exactly `bytes.len() * 8` bits.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).map(move |i| (byte >> (7 - i)) & 1 == 1))
        .collect()
}

/// Pack a 1-bit raster (or any bit vector) MSB-first into bytes.
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    bits_to_bytes(bits)
}

/// Unpack `bytes` and truncate to exactly `bit_len` bits, dropping the
/// zero padding [`pack_bits`] added to reach a byte boundary.
pub fn unpack_bits(bytes: &[u8], bit_len: usize) -> Vec<bool> {
    let mut bits = bytes_to_bits(bytes);
    bits.truncate(bit_len);
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let bytes = vec![0u8, 1, 255, 128, 42];
        let bits = bytes_to_bits(&bytes);
        assert_eq!(bits.len(), bytes.len() * 8);
        assert_eq!(bits_to_bytes(&bits), bytes);
    }

    #[test]
    fn packbits_round_trip_with_non_byte_aligned_length() {
        let bits = vec![true, false, true, true, false, false, true, false, true, true];
        let packed = pack_bits(&bits);
        assert_eq!(packed.len(), 2);
        assert_eq!(unpack_bits(&packed, bits.len()), bits);
    }
}
