//! Shared candidate-shape enumeration used by the Level-0/1 corrector (C5).
//!
//! A (possibly split) neighbour group is classified by where its window
//! sits relative to the segment: `Start` groups include position 0 (no
//! "before" anchor exists), `End` groups include the last position (no
//! "after" anchor exists), and `Middle` groups have both. The table in
//! the specification names eight shapes (S2-S4, E2-E4, M2-M5); this module
//! treats the shape name as derived from `(class, window length)` rather
//! than as a literal tag-string match, which sidesteps a slicing bug the
//! reference implementation has in one Level-1 branch (see DESIGN.md).

use crate::tables::{MappingTables, TwoMer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeClass {
    Start,
    End,
    Middle,
}

/// Classify a neighbour group's window against the segment length, or
/// `None` if it matches none of the eight recognised shapes.
pub fn classify(group: &[usize], segment_len: usize) -> Option<ShapeClass> {
    if group.is_empty() {
        return None;
    }
    let len = group.len();
    let last = *group.last().unwrap();

    if group[0] == 0 {
        if (2..=4).contains(&len) {
            Some(ShapeClass::Start)
        } else {
            None
        }
    } else if last == segment_len - 1 {
        if (2..=4).contains(&len) {
            Some(ShapeClass::End)
        } else {
            None
        }
    } else if (2..=5).contains(&len) {
        Some(ShapeClass::Middle)
    } else {
        None
    }
}

fn enumerate_chains(starts: &[TwoMer], len: usize, tables: &MappingTables) -> Vec<Vec<TwoMer>> {
    let mut chains: Vec<Vec<TwoMer>> = starts.iter().map(|&p| vec![p]).collect();
    for _ in 1..len {
        let mut extended = Vec::with_capacity(chains.len() * 4);
        for chain in &chains {
            let last = *chain.last().unwrap();
            for q in tables.next(last) {
                let mut next_chain = chain.clone();
                next_chain.push(q);
                extended.push(next_chain);
            }
        }
        chains = extended;
    }
    chains
}

fn base_match_ok(chain: &[TwoMer], observed: &[TwoMer]) -> bool {
    chain
        .iter()
        .zip(observed.iter())
        .all(|(c, o)| c.shares_a_base_with(*o))
}

/// Enumerate replacement candidates for a group of length 2-4 (every
/// shape except M5), given the class determined by [`classify`].
///
/// `before_anchor`/`after_anchor` are `None` exactly when the
/// corresponding side of the window has no anchor (start-of-segment or
/// end-of-segment respectively).
#[allow(clippy::too_many_arguments)]
fn candidates_generic(
    class: ShapeClass,
    observed: &[TwoMer],
    s: usize,
    before_anchor: Option<TwoMer>,
    after_anchor: Option<TwoMer>,
    level: u8,
    tables: &MappingTables,
) -> Vec<Vec<TwoMer>> {
    let len = observed.len();
    let starts: Vec<TwoMer> = match class {
        ShapeClass::Start => tables.initial(s).to_vec(),
        ShapeClass::End | ShapeClass::Middle => tables
            .next(before_anchor.expect("End/Middle groups have a before-anchor"))
            .to_vec(),
    };

    let mut out: Vec<Vec<TwoMer>> = Vec::new();
    for chain in enumerate_chains(&starts, len, tables) {
        if let Some(after) = after_anchor {
            if !tables.is_successor(*chain.last().unwrap(), after) {
                continue;
            }
        }
        if level == 0 && !base_match_ok(&chain, observed) {
            continue;
        }
        out.push(chain);
    }

    // Open Question (c): Level 1's E3 shape additionally emits the union
    // of a "successor chain without final closure" relaxation — the
    // first step must still follow the anchor, but the window's last
    // position is not required to re-validate against its predecessor.
    // This keeps the shape's enumeration bounded (4 * 4 * 16 = 256) while
    // genuinely widening the search beyond the full-chain set above.
    if level == 1 && class == ShapeClass::End && len == 3 {
        let before = before_anchor.expect("End groups have a before-anchor");
        for p0 in tables.next(before) {
            for p1 in tables.next(p0) {
                for p2 in TwoMer::all() {
                    let candidate = vec![p0, p1, p2];
                    if !out.contains(&candidate) {
                        out.push(candidate);
                    }
                }
            }
        }
    }

    out
}

/// Candidates for an interior (`Middle`) group of length exactly 5 (the
/// M5 shape), which is handled specially per §4.5.
fn m5_candidates(
    observed: &[TwoMer],
    before_anchor: TwoMer,
    after_anchor: TwoMer,
    level: u8,
    tables: &MappingTables,
) -> Vec<Vec<TwoMer>> {
    let mut out = Vec::new();

    if level == 0 {
        // The middle two-mer is assumed correct; only the two flanking
        // pairs are searched, each restricted to share a base with its
        // observed value.
        let middle = observed[2];

        let mut left_candidates = Vec::new();
        for p0 in tables.next(before_anchor) {
            if !p0.shares_a_base_with(observed[0]) {
                continue;
            }
            for p1 in tables.next(p0) {
                if !p1.shares_a_base_with(observed[1]) {
                    continue;
                }
                if tables.is_successor(p1, middle) {
                    left_candidates.push((p0, p1));
                }
            }
        }

        let mut right_candidates = Vec::new();
        for p3 in tables.next(middle) {
            if !p3.shares_a_base_with(observed[3]) {
                continue;
            }
            for p4 in tables.next(p3) {
                if !p4.shares_a_base_with(observed[4]) {
                    continue;
                }
                if tables.is_successor(p4, after_anchor) {
                    right_candidates.push((p3, p4));
                }
            }
        }

        for &(p0, p1) in &left_candidates {
            for &(p3, p4) in &right_candidates {
                out.push(vec![p0, p1, middle, p3, p4]);
            }
        }
    } else {
        // All three middle two-mers are unknown: the flanking positions
        // (window[0] and window[4]) are themselves drawn from the
        // anchors' successor/predecessor sets with no base-match
        // restriction, then bridged by every length-3 path between them.
        let lefts = tables.next(before_anchor);
        let rights = tables.predecessors_of(after_anchor);

        for &p0 in &lefts {
            for p1 in tables.next(p0) {
                for p2 in tables.next(p1) {
                    for p3 in tables.next(p2) {
                        for &p4 in &rights {
                            if tables.is_successor(p3, p4) {
                                out.push(vec![p0, p1, p2, p3, p4]);
                            }
                        }
                    }
                }
            }
        }
    }

    out
}

/// Enumerate replacement candidates for any of the eight shapes for a
/// single (split) neighbour group.
///
/// `seq` is the full, possibly-corrupted segment; `group` is the
/// already-split list of positions (ascending, contiguous); `level` is 0
/// or 1.
pub fn candidates_for_group(
    seq: &[TwoMer],
    s: usize,
    group: &[usize],
    level: u8,
    tables: &MappingTables,
) -> Vec<Vec<TwoMer>> {
    let l = seq.len();
    let class = match classify(group, l) {
        Some(c) => c,
        None => return Vec::new(),
    };

    let observed: Vec<TwoMer> = group.iter().map(|&i| seq[i]).collect();
    let first = group[0];
    let last = *group.last().unwrap();

    let before_anchor = if first > 0 { Some(seq[first - 1]) } else { None };
    let after_anchor = if last + 1 < l { Some(seq[last + 1]) } else { None };

    if class == ShapeClass::Middle && group.len() == 5 {
        return match (before_anchor, after_anchor) {
            (Some(b), Some(a)) => m5_candidates(&observed, b, a, level, tables),
            _ => Vec::new(),
        };
    }

    candidates_generic(class, &observed, s, before_anchor, after_anchor, level, tables)
}
