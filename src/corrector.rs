//! Level 0 and Level 1 correction. Consumes the split neighbour
//! groups produced by the validator, enumerates per-group replacement
//! windows via [`crate::shapes`], and verifies each full-segment
//! candidate against both the DMR scheme and the outer RS codeword.

use crate::bits;
use crate::rs_segment::RsSegmentCodec;
use crate::shapes;
use crate::tables::{MappingTables, TwoMer};
use crate::translator;
use crate::validator;

/// A verified replacement for a corrupted segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub segment: Vec<TwoMer>,
    pub decoded_payload: Vec<u8>,
    /// Position of this candidate within the Cartesian product search
    /// order (ascending group index, then ascending per-group candidate
    /// index) — used downstream only as a stable tie-break key.
    pub rank: usize,
}

/// Run Level 0 (`level == 0`) or Level 1 (`level == 1`) correction on
/// `seq`. Returns every candidate that both re-validates cleanly under
/// the DMR scheme and whose decoded bytes check out against `rs`.
///
/// Three preconditions gate a non-empty result: the segment must carry
/// at least one inconsistency, the neighbour groups (after splitting on
/// any `TmFnmT` position) must be non-empty, and the largest split group
/// must be no longer than 5 two-mers. Any of these failing yields an
/// empty candidate list rather than an error — an unsatisfiable segment
/// is simply escalated to the next level by the caller.
pub fn correct_level(
    seq: &[TwoMer],
    s: usize,
    level: u8,
    rs: &RsSegmentCodec,
    tables: &MappingTables,
) -> Vec<Candidate> {
    let validation = match validator::validate(seq, s, tables) {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };
    if validator::check(&validation) {
        return Vec::new();
    }

    let raw_groups = validator::neighbour_groups(&validation);
    if raw_groups.is_empty() {
        return Vec::new();
    }

    let mut split_groups: Vec<Vec<usize>> = Vec::new();
    for g in &raw_groups {
        split_groups.extend(validator::split_groups_on(g, &validation));
    }
    if split_groups.is_empty() {
        return Vec::new();
    }

    let max_len = split_groups.iter().map(|g| g.len()).max().unwrap_or(0);
    if max_len < 2 || max_len > 5 {
        return Vec::new();
    }

    let mut per_group_candidates: Vec<Vec<Vec<TwoMer>>> = Vec::with_capacity(split_groups.len());
    for g in &split_groups {
        let cands = shapes::candidates_for_group(seq, s, g, level, tables);
        if cands.is_empty() {
            return Vec::new();
        }
        per_group_candidates.push(cands);
    }

    // Cartesian product across groups: each combination substitutes every
    // group's window into an otherwise-unchanged copy of the segment.
    let mut pool: Vec<Vec<TwoMer>> = vec![seq.to_vec()];
    for (group, cands) in split_groups.iter().zip(per_group_candidates.iter()) {
        let mut extended = Vec::with_capacity(pool.len() * cands.len());
        for base in &pool {
            for cand in cands {
                let mut next = base.clone();
                for (offset, &pos) in group.iter().enumerate() {
                    next[pos] = cand[offset];
                }
                extended.push(next);
            }
        }
        pool = extended;
    }

    let mut out = Vec::new();
    for (rank, candidate_seq) in pool.into_iter().enumerate() {
        let v2 = match validator::validate(&candidate_seq, s, tables) {
            Ok(v) => v,
            Err(_) => continue,
        };
        if !validator::check(&v2) {
            continue;
        }
        let decoded_bits = match translator::decode_strict(&candidate_seq, s, tables) {
            Ok(b) => b,
            Err(_) => continue,
        };
        let codeword = bits::bits_to_bytes(&decoded_bits);
        let (payload, _errata) = match rs.decode_bytes(&codeword) {
            Ok(r) => r,
            Err(_) => continue,
        };
        out.push(Candidate {
            segment: candidate_seq,
            decoded_payload: payload,
            rank,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rs_segment::RsSegmentCodec;

    #[test]
    fn clean_segment_yields_no_candidates() {
        let tables = MappingTables::load_default().unwrap();
        let rs = RsSegmentCodec::new(4).unwrap();
        let payload = vec![0u8; 4];
        let codeword = rs.encode_bytes(&payload).unwrap();
        let bits = bits::bytes_to_bits(&codeword);
        let seq = translator::encode(&bits, 0, &tables).unwrap();
        assert!(correct_level(&seq, 0, 0, &rs, &tables).is_empty());
    }

    #[test]
    fn single_substitution_is_recovered_at_level0() {
        let tables = MappingTables::load_default().unwrap();
        let rs = RsSegmentCodec::new(6).unwrap();
        let payload = vec![0xABu8; 6];
        let codeword = rs.encode_bytes(&payload).unwrap();
        let bits = bits::bytes_to_bits(&codeword);
        let seq = translator::encode(&bits, 0, &tables).unwrap();

        let mut corrupted = seq.clone();
        // Pick an interior position and corrupt it to something still
        // sharing a base, so the Level-0 heuristic can consider it.
        let pos = seq.len() / 2;
        let original = corrupted[pos];
        let bumped = TwoMer((original.0 + 1) % 16);
        corrupted[pos] = bumped;

        let validation = validator::validate(&corrupted, 0, &tables).unwrap();
        if validator::check(&validation) {
            // The bump happened not to break the scheme; nothing to test.
            return;
        }

        let candidates = correct_level(&corrupted, 0, 0, &rs, &tables);
        assert!(candidates.iter().any(|c| c.segment == seq));
    }
}
