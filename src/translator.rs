//! C2: the bit/DNA translator — encode, strict decode, and the "tolerant"
//! (enhanced) decoder that salvages a best-effort bit string from a
//! sequence carrying violations of the DMR scheme.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::{DmrError, Result};
use crate::tables::{MappingTables, TwoMer};

fn bit_pair_value(hi: bool, lo: bool) -> u8 {
    (hi as u8) * 2 + lo as u8
}

fn push_pair(bits: &mut Vec<bool>, t: u8) {
    bits.push(t & 2 != 0);
    bits.push(t & 1 != 0);
}

/// Encode a bit string (even length) into a DNA two-mer sequence under
/// segment-index class `s`.
pub fn encode(bits: &[bool], s: usize, tables: &MappingTables) -> Result<Vec<TwoMer>> {
    if bits.is_empty() {
        return Err(DmrError::EmptySegment);
    }
    if bits.len() % 2 != 0 {
        return Err(DmrError::OddLength(bits.len()));
    }

    let mut out = Vec::with_capacity(bits.len() / 2);
    let t0 = bit_pair_value(bits[0], bits[1]);
    let mut last = tables.initial(s)[t0 as usize];
    out.push(last);

    let mut i = 2;
    while i < bits.len() {
        let t = bit_pair_value(bits[i], bits[i + 1]);
        last = tables.next(last)[t as usize];
        out.push(last);
        i += 2;
    }
    Ok(out)
}

/// Invert [`encode`] step by step. Fails as soon as a two-mer cannot be
/// placed within the scheme.
pub fn decode_strict(seq: &[TwoMer], s: usize, tables: &MappingTables) -> Result<Vec<bool>> {
    if seq.is_empty() {
        return Err(DmrError::EmptySegment);
    }

    let mut bits = Vec::with_capacity(seq.len() * 2);
    let t0 = tables
        .initial_bit_pair(s, seq[0])
        .ok_or(DmrError::NotInScheme(0))?;
    push_pair(&mut bits, t0);

    for i in 1..seq.len() {
        let t = tables
            .next_bit_pair(seq[i - 1], seq[i])
            .ok_or(DmrError::NotInScheme(i))?;
        push_pair(&mut bits, t);
    }
    Ok(bits)
}

/// Best-effort decode that never fails. Used by the pipeline once
/// correction has been exhausted and a residual bit string is still
/// wanted for downstream (outer-RS-bounded) recovery.
///
/// `segment_index` and `seed` together select the seeded RNG used for the
/// double-violation fallback, so that repeated decodes of the same input
/// under the same seed are bitwise identical (testable property 5).
pub fn decode_tolerant(
    seq: &[TwoMer],
    s: usize,
    segment_index: u64,
    seed: u64,
    tables: &MappingTables,
) -> Vec<bool> {
    let mut rng = StdRng::seed_from_u64(seed ^ segment_index);
    let mut bits: Vec<bool> = Vec::with_capacity(seq.len() * 2);
    if seq.is_empty() {
        return bits;
    }

    let t0 = tables.initial_bit_pair(s, seq[0]).unwrap_or(0);
    push_pair(&mut bits, t0);
    let mut last = seq[0];

    let l = seq.len();
    let mut j = 1;
    while j < l {
        let current = seq[j];

        if let Some(t) = tables.next_bit_pair(last, current) {
            push_pair(&mut bits, t);
            last = current;
            j += 1;
            continue;
        }

        // One-step salvage: is there a `v` that both follows `last` and
        // precedes the two-mer *after* the violation? If so `v` is almost
        // certainly the intended two-mer and `current` is a single
        // substitution error.
        let salvage = if j + 1 < l {
            tables
                .next(last)
                .into_iter()
                .find(|&v| tables.is_successor(v, seq[j + 1]))
        } else {
            None
        };

        if let Some(v) = salvage {
            let t = tables
                .next_bit_pair(last, v)
                .expect("v was drawn from NEXT[last]");
            push_pair(&mut bits, t);
            last = v;
            j += 1;
            continue;
        }

        // Two consecutive violations: nothing local to anchor on. Emit a
        // filler 6 bits and jump past the damaged window.
        if bits.len() >= 8 {
            let start = bits.len() - 8;
            let dup: Vec<bool> = bits[start..start + 6].to_vec();
            bits.extend(dup);
        } else {
            for _ in 0..6 {
                bits.push(rng.gen_bool(0.5));
            }
        }

        if j + 2 < l {
            last = seq[j + 2];
            j += 3;
        } else {
            // Not enough two-mers remain to resume cleanly.
            break;
        }
    }

    bits
}

/// Render a two-mer sequence as a DNA string.
pub fn to_dna_string(seq: &[TwoMer]) -> String {
    seq.iter().map(|p| p.to_string()).collect()
}

/// Parse a DNA string into a two-mer sequence. Fails on an odd base count
/// or an unrecognised character.
pub fn from_dna_string(s: &str) -> Result<Vec<TwoMer>> {
    if s.is_empty() {
        return Err(DmrError::EmptySegment);
    }
    if s.chars().count() % 2 != 0 {
        return Err(DmrError::OddLength(s.chars().count()));
    }
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(2)
        .map(|pair| TwoMer::from_str(&pair.iter().collect::<String>()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_from_str(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn scenario_one_round_trip() {
        let tables = MappingTables::load_default().unwrap();
        let bits = bits_from_str("00000000");
        let encoded = encode(&bits, 0, &tables).unwrap();
        assert_eq!(to_dna_string(&encoded), "AAAAAAAA");
        let decoded = decode_strict(&encoded, 0, &tables).unwrap();
        assert_eq!(decoded, bits);
    }

    #[test]
    fn scenario_two_encoding() {
        let tables = MappingTables::load_default().unwrap();
        let bits = bits_from_str("0100011011");
        let encoded = encode(&bits, 1, &tables).unwrap();
        assert_eq!(to_dna_string(&encoded), "CCCCCGGAGT");
    }

    #[test]
    fn round_trip_is_identity_for_all_classes() {
        let tables = MappingTables::load_default().unwrap();
        let bits = bits_from_str("1101001011100001");
        for s in 0..4 {
            let encoded = encode(&bits, s, &tables).unwrap();
            let decoded = decode_strict(&encoded, s, &tables).unwrap();
            assert_eq!(decoded, bits, "class {s} failed round trip");
        }
    }

    #[test]
    fn tolerant_matches_strict_on_clean_input() {
        let tables = MappingTables::load_default().unwrap();
        let bits = bits_from_str("1101001011100001");
        let encoded = encode(&bits, 2, &tables).unwrap();
        let strict = decode_strict(&encoded, 2, &tables).unwrap();
        let tolerant = decode_tolerant(&encoded, 2, 0, 42, &tables);
        assert_eq!(strict, tolerant);
    }

    #[test]
    fn tolerant_decode_is_deterministic_given_seed() {
        let tables = MappingTables::load_default().unwrap();
        let mut seq = from_dna_string("AAAAAAAAAAAAAAAA").unwrap();
        seq[3] = TwoMer::from_str("TT").unwrap();
        seq[4] = TwoMer::from_str("GG").unwrap();
        let a = decode_tolerant(&seq, 0, 7, 99, &tables);
        let b = decode_tolerant(&seq, 0, 7, 99, &tables);
        assert_eq!(a, b);
    }
}
