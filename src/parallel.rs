//! Segment-level parallelism for DMR encoding. Segments are independent
//! once their index is known, so encoding fans out one rayon task per
//! chunk, matching the pipeline's (C8) own `par_iter` discipline.

use rayon::prelude::*;

use crate::bits;
use crate::errors::Result;
use crate::rs_segment::RsSegmentCodec;
use crate::tables::MappingTables;
use crate::translator;

/// RS-encode, then DMR-encode, every chunk in `chunks`, in parallel.
/// Segment `i`'s index class is `i % 4`, matching [`crate::pipeline`]'s
/// convention on decode. Returns the DNA string for each chunk, in the
/// same order as `chunks`.
pub fn encode_segments_parallel(
    chunks: &[Vec<u8>],
    rs: &RsSegmentCodec,
    tables: &MappingTables,
) -> Result<Vec<String>> {
    chunks
        .par_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let codeword = rs.encode_bytes(chunk)?;
            let bit_vec = bits::bytes_to_bits(&codeword);
            let s = i % 4;
            let seq = translator::encode(&bit_vec, s, tables)?;
            Ok(translator::to_dna_string(&seq))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_every_chunk_to_a_dna_string_of_even_length() {
        let tables = MappingTables::load_default().unwrap();
        let rs = RsSegmentCodec::new(4).unwrap();
        let chunks = vec![vec![1u8, 2, 3, 4], vec![5u8, 6, 7, 8], vec![9u8, 10, 11, 12]];

        let encoded = encode_segments_parallel(&chunks, &rs, &tables).unwrap();
        assert_eq!(encoded.len(), chunks.len());
        for dna in &encoded {
            assert_eq!(dna.chars().count() % 2, 0);
            assert!(dna.chars().all(|c| "ACGT".contains(c)));
        }
    }
}
