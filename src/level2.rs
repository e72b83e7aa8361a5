//! C6: Level 2 — exhaustive single-two-mer substitution over the
//! longest (unsplit) neighbour group, each hypothesis re-attempted
//! through Level 0 then Level 1.

use crate::corrector::{self, Candidate};
use crate::rs_segment::RsSegmentCodec;
use crate::tables::{MappingTables, TwoMer};
use crate::validator;

/// Try every interior offset of the segment's longest neighbour group
/// (the group *before* any `TmFnmT` split, since Level 2 searches a
/// wider window than Level 0/1 do) against all 16 two-mers, re-running
/// Level 0 and then Level 1 on each hypothesis. Returns the first
/// non-empty result found, iterating offsets ascending and, within an
/// offset, two-mers in canonical order.
pub fn correct_level2(
    seq: &[TwoMer],
    s: usize,
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

    let groups = validator::neighbour_groups(&validation);
    let g_star = match groups.iter().max_by_key(|g| g.len()) {
        Some(g) if g.len() >= 2 => g.clone(),
        _ => return Vec::new(),
    };

    for k in 1..g_star.len() {
        let pos = g_star[0] + k;
        for q in TwoMer::all() {
            let mut hypothesis = seq.to_vec();
            hypothesis[pos] = q;

            let l0 = corrector::correct_level(&hypothesis, s, 0, rs, tables);
            if !l0.is_empty() {
                return l0;
            }
            let l1 = corrector::correct_level(&hypothesis, s, 1, rs, tables);
            if !l1.is_empty() {
                return l1;
            }
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits;
    use crate::translator;

    #[test]
    fn clean_segment_yields_nothing() {
        let tables = MappingTables::load_default().unwrap();
        let rs = RsSegmentCodec::new(4).unwrap();
        let payload = vec![0u8; 4];
        let codeword = rs.encode_bytes(&payload).unwrap();
        let bits = bits::bytes_to_bits(&codeword);
        let seq = translator::encode(&bits, 0, &tables).unwrap();
        assert!(correct_level2(&seq, 0, &rs, &tables).is_empty());
    }
}
