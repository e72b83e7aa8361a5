//! Deterministic 2-bit-per-base mapping used by the `No`/`Rs`-family CLI
//! modes, which bypass the DMR core entirely (§4.14). The reference
//! implementation's `bits_to_dna`/`dna_to_bits` draw a random base among
//! several many-to-one candidates per bit pair from `mapping_table_two_bit.json`;
//! that randomisation exists to diversify GC content across runs with no
//! decode-side benefit, so these baseline modes use a fixed one-to-one
//! mapping instead (see DESIGN.md). Bit pairs are labelled the same way as
//! the DMR translator: `00->0, 01->1, 10->2, 11->3`.

use crate::bits;
use crate::errors::{DmrError, Result};

const BASES: [char; 4] = ['A', 'C', 'G', 'T'];

fn base_to_bit_pair(c: char) -> Result<(bool, bool)> {
    match c {
        'A' => Ok((false, false)),
        'C' => Ok((false, true)),
        'G' => Ok((true, false)),
        'T' => Ok((true, true)),
        other => Err(DmrError::InvalidBase(other)),
    }
}

/// Encode `bytes` as a DNA string, two bits per base, MSB-first.
pub fn encode(bytes: &[u8]) -> String {
    let bit_vec = bits::bytes_to_bits(bytes);
    bit_vec
        .chunks(2)
        .map(|pair| {
            let hi = pair[0];
            let lo = pair.get(1).copied().unwrap_or(false);
            let idx = (hi as usize) * 2 + lo as usize;
            BASES[idx]
        })
        .collect()
}

/// Invert [`encode`]. Fails on a character outside {A,C,G,T}.
pub fn decode(dna: &str) -> Result<Vec<u8>> {
    let mut bit_vec = Vec::with_capacity(dna.chars().count() * 2);
    for c in dna.chars() {
        let (hi, lo) = base_to_bit_pair(c)?;
        bit_vec.push(hi);
        bit_vec.push(lo);
    }
    Ok(bits::bits_to_bytes(&bit_vec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_identity() {
        let bytes = b"plain baseline payload".to_vec();
        let dna = encode(&bytes);
        assert!(dna.chars().all(|c| "ACGT".contains(c)));
        assert_eq!(decode(&dna).unwrap(), bytes);
    }

    #[test]
    fn empty_input_round_trips() {
        assert_eq!(encode(&[]), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn unknown_base_is_rejected() {
        assert!(decode("ACGN").is_err());
    }
}
