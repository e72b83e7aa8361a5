//! C7: escalation across Level 0 -> Level 1 -> Level 2 -> Level 3
//! (reserved, currently always empty).

use crate::corrector::{self, Candidate};
use crate::level2;
use crate::rs_segment::RsSegmentCodec;
use crate::tables::{MappingTables, TwoMer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    L0,
    L1,
    L2,
    /// Reserved for future use; never produces candidates today.
    L3,
}

#[derive(Debug, Clone)]
pub struct LevelResult {
    pub candidates: Vec<Candidate>,
    pub level_used: Level,
    pub segment_index: u64,
}

/// Escalate through the correction levels for a single corrupted
/// segment, stopping at the first level that produces any candidate.
pub fn level_master(
    seq: &[TwoMer],
    s: usize,
    segment_index: u64,
    rs: &RsSegmentCodec,
    tables: &MappingTables,
) -> LevelResult {
    let l0 = corrector::correct_level(seq, s, 0, rs, tables);
    if !l0.is_empty() {
        return LevelResult {
            candidates: l0,
            level_used: Level::L0,
            segment_index,
        };
    }

    let l1 = corrector::correct_level(seq, s, 1, rs, tables);
    if !l1.is_empty() {
        return LevelResult {
            candidates: l1,
            level_used: Level::L1,
            segment_index,
        };
    }

    let l2 = level2::correct_level2(seq, s, rs, tables);
    if !l2.is_empty() {
        return LevelResult {
            candidates: l2,
            level_used: Level::L2,
            segment_index,
        };
    }

    LevelResult {
        candidates: Vec::new(),
        level_used: Level::L3,
        segment_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits;
    use crate::translator;

    #[test]
    fn clean_segment_never_escalates_past_l0_with_zero_candidates() {
        let tables = MappingTables::load_default().unwrap();
        let rs = RsSegmentCodec::new(4).unwrap();
        let payload = vec![7u8; 4];
        let codeword = rs.encode_bytes(&payload).unwrap();
        let bits = bits::bytes_to_bits(&codeword);
        let seq = translator::encode(&bits, 0, &tables).unwrap();
        let result = level_master(&seq, 0, 0, &rs, &tables);
        assert!(result.candidates.is_empty());
        assert_eq!(result.level_used, Level::L3);
    }
}
