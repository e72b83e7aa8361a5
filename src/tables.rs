//! C1: the Dynamic Mapping Rule's static tables.
//!
//! `INITIAL[s]` gives the four two-mers allowed to start a segment whose
//! index class is `s`; `NEXT[p]` gives the four two-mers allowed to follow
//! two-mer `p`. Both are loaded once, verbatim, from an embedded JSON asset
//! and never mutated afterwards.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::errors::{DmrError, Result};

/// A single DNA base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    A,
    C,
    G,
    T,
}

impl Base {
    pub fn to_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::T => 'T',
        }
    }

    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'A' => Ok(Base::A),
            'C' => Ok(Base::C),
            'G' => Ok(Base::G),
            'T' => Ok(Base::T),
            other => Err(DmrError::InvalidBase(other)),
        }
    }

    pub const ALL: [Base; 4] = [Base::A, Base::C, Base::G, Base::T];
}

/// An ordered pair of bases, stored as an index `0..16` (`4*first + second`).
///
/// Using the packed index rather than a `(Base, Base)` tuple keeps every
/// table lookup a plain array index, matching the finite-state-machine
/// framing in the design notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TwoMer(pub u8);

impl TwoMer {
    pub fn new(first: Base, second: Base) -> Self {
        TwoMer((first as u8) * 4 + second as u8)
    }

    pub fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let first = Base::from_char(chars.next().ok_or(DmrError::EmptySegment)?)?;
        let second = Base::from_char(chars.next().ok_or(DmrError::EmptySegment)?)?;
        if chars.next().is_some() {
            return Err(DmrError::OddLength(s.chars().count()));
        }
        Ok(TwoMer::new(first, second))
    }

    pub fn first(self) -> Base {
        Base::ALL[(self.0 / 4) as usize]
    }

    pub fn second(self) -> Base {
        Base::ALL[(self.0 % 4) as usize]
    }

    pub fn shares_a_base_with(self, other: TwoMer) -> bool {
        self.first() == other.first() || self.second() == other.second()
    }

    /// All 16 two-mers in canonical (index) order.
    pub fn all() -> [TwoMer; 16] {
        let mut out = [TwoMer(0); 16];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = TwoMer(i as u8);
        }
        out
    }
}

impl fmt::Display for TwoMer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.first().to_char(), self.second().to_char())
    }
}

#[derive(Debug, Deserialize)]
struct RawMappingTable {
    initial_2mer: HashMap<String, [String; 4]>,
    map_library: HashMap<String, [String; 4]>,
}

/// Embedded, parsed copy of `mapping_table_dmr.json`.
#[derive(Debug, Clone)]
pub struct MappingTables {
    initial: [[TwoMer; 4]; 4],
    next: [[TwoMer; 4]; 16],
    predecessors: [[TwoMer; 4]; 16],
}

const EMBEDDED_TABLE: &str = include_str!("../assets/mapping_table_dmr.json");

impl MappingTables {
    /// Parse the table embedded in the binary at compile time.
    pub fn load_default() -> Result<Self> {
        Self::from_json(EMBEDDED_TABLE)
    }

    /// Parse a table document in the same shape as the embedded asset.
    /// Exposed so the CLI's `--table` override and tests can load
    /// alternate schemes.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawMappingTable = serde_json::from_str(json)
            .map_err(|e| DmrError::RsCodecError(format!("mapping table parse error: {e}")))?;

        let mut initial = [[TwoMer(0); 4]; 4];
        for s in 0..4 {
            let entries = raw
                .initial_2mer
                .get(&s.to_string())
                .ok_or_else(|| DmrError::RsCodecError(format!("missing initial_2mer[{s}]")))?;
            for (t, entry) in entries.iter().enumerate() {
                initial[s][t] = TwoMer::from_str(entry)?;
            }
        }

        let mut next = [[TwoMer(0); 4]; 16];
        for p in TwoMer::all() {
            let entries = raw
                .map_library
                .get(&p.to_string())
                .ok_or_else(|| DmrError::RsCodecError(format!("missing map_library[{p}]")))?;
            for (t, entry) in entries.iter().enumerate() {
                next[p.0 as usize][t] = TwoMer::from_str(entry)?;
            }
        }

        let mut predecessors = [[TwoMer(0); 4]; 16];
        let mut fill = [0usize; 16];
        for p in TwoMer::all() {
            for &q in &next[p.0 as usize] {
                let slot = fill[q.0 as usize];
                predecessors[q.0 as usize][slot] = p;
                fill[q.0 as usize] += 1;
            }
        }

        Ok(MappingTables {
            initial,
            next,
            predecessors,
        })
    }

    pub fn initial(&self, s: usize) -> [TwoMer; 4] {
        self.initial[s % 4]
    }

    pub fn next(&self, p: TwoMer) -> [TwoMer; 4] {
        self.next[p.0 as usize]
    }

    pub fn predecessors_of(&self, q: TwoMer) -> [TwoMer; 4] {
        self.predecessors[q.0 as usize]
    }

    pub fn is_initial(&self, s: usize, p: TwoMer) -> bool {
        self.initial(s).contains(&p)
    }

    pub fn is_successor(&self, p: TwoMer, q: TwoMer) -> bool {
        self.next(p).contains(&q)
    }

    /// Index of `p` within `INITIAL[s]`, i.e. the bit pair that encodes to it.
    pub fn initial_bit_pair(&self, s: usize, p: TwoMer) -> Option<u8> {
        self.initial(s).iter().position(|&x| x == p).map(|i| i as u8)
    }

    /// Index of `q` within `NEXT[p]`, i.e. the bit pair that encodes to it.
    pub fn next_bit_pair(&self, p: TwoMer, q: TwoMer) -> Option<u8> {
        self.next(p).iter().position(|&x| x == q).map(|i| i as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_embedded_table() {
        let tables = MappingTables::load_default().unwrap();
        assert_eq!(tables.initial(0)[0], TwoMer::from_str("AA").unwrap());
    }

    #[test]
    fn every_twomer_has_four_predecessors_and_successors() {
        let tables = MappingTables::load_default().unwrap();
        for p in TwoMer::all() {
            let succ = tables.next(p);
            let mut seen = succ.to_vec();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), 4, "NEXT[{p}] must be 4 distinct two-mers");
        }
        let mut predecessor_counts = [0usize; 16];
        for p in TwoMer::all() {
            for q in tables.next(p) {
                predecessor_counts[q.0 as usize] += 1;
            }
        }
        assert!(predecessor_counts.iter().all(|&c| c == 4));
    }

    #[test]
    fn scenario_one_initial_tables() {
        let tables = MappingTables::load_default().unwrap();
        assert_eq!(tables.initial(0)[0].to_string(), "AA");
        assert_eq!(tables.next(TwoMer::from_str("AA").unwrap())[0].to_string(), "AA");
    }
}
