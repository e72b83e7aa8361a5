//! Payload chunking: splits a masked byte stream into fixed-length chunks
//! ready for per-segment RS encoding, zero-padding the final chunk so every
//! chunk is exactly `chunk_len` bytes.

/// Split `bytes` into `chunk_len`-byte chunks, zero-padding the last chunk
/// if `bytes.len()` is not a multiple of `chunk_len`. `chunk_len` must be
/// non-zero; callers derive it from [`crate::rs_segment::recalculate`]'s
/// payload size.
pub fn chunk_payload(bytes: &[u8], chunk_len: usize) -> Vec<Vec<u8>> {
    assert!(chunk_len > 0, "chunk_len must be non-zero");
    if bytes.is_empty() {
        return Vec::new();
    }
    bytes
        .chunks(chunk_len)
        .map(|chunk| {
            let mut padded = chunk.to_vec();
            padded.resize(chunk_len, 0);
            padded
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_multiple_chunks_without_padding() {
        let bytes = vec![1u8, 2, 3, 4, 5, 6];
        let chunks = chunk_payload(&bytes, 3);
        assert_eq!(chunks, vec![vec![1, 2, 3], vec![4, 5, 6]]);
    }

    #[test]
    fn final_chunk_is_zero_padded() {
        let bytes = vec![1u8, 2, 3, 4, 5];
        let chunks = chunk_payload(&bytes, 3);
        assert_eq!(chunks, vec![vec![1, 2, 3], vec![4, 5, 0]]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_payload(&[], 4).is_empty());
    }
}
