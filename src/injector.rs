//! C13: the seeded substitution/insertion/deletion mutator used by the
//! `simulate` CLI command and by tests. This is the DMR/RS-segmented-
//! packbits counterpart of the reference implementation's spacer-aware
//! binomial mutator (`binom_mutations_with_spacer_ignorance`); it draws
//! independent per-base Bernoulli events from a seeded RNG rather than
//! sampling an exact event count, which is simpler and still satisfies the
//! harness's only real contract: bounded, reproducible, spacer-blind
//! corruption. Not part of the decode path.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::spacer::SPACER;

const BASES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Per-base Bernoulli probabilities, each independently drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorRates {
    pub substitution: f64,
    pub insertion: f64,
    pub deletion: f64,
}

/// Restricts which of the three event classes [`inject_errors`] is allowed
/// to draw, independent of the configured rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    All,
    Subs,
    Ins,
    Del,
}

impl ErrorKind {
    fn allows_sub(self) -> bool {
        matches!(self, ErrorKind::All | ErrorKind::Subs)
    }
    fn allows_ins(self) -> bool {
        matches!(self, ErrorKind::All | ErrorKind::Ins)
    }
    fn allows_del(self) -> bool {
        matches!(self, ErrorKind::All | ErrorKind::Del)
    }
}

/// Apply independent substitution/insertion/deletion events to every base
/// of `dna`, never touching a spacer (`X`) character and never letting an
/// insertion or deletion shift a spacer's position relative to the
/// segments it delimits — each base is visited once, in order, and any
/// inserted base is appended immediately after it.
pub fn inject_errors(dna: &str, rates: ErrorRates, kind: ErrorKind, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = String::with_capacity(dna.len());

    for c in dna.chars() {
        if c == SPACER {
            out.push(c);
            continue;
        }

        let mut base = c;
        if kind.allows_sub() && rng.gen_bool(rates.substitution.clamp(0.0, 1.0)) {
            let alt = BASES
                .iter()
                .copied()
                .filter(|&b| b != base)
                .collect::<Vec<_>>()
                .choose(&mut rng)
                .copied()
                .unwrap_or(base);
            base = alt;
        }

        if kind.allows_del() && rng.gen_bool(rates.deletion.clamp(0.0, 1.0)) {
            continue;
        }

        out.push(base);

        if kind.allows_ins() && rng.gen_bool(rates.insertion.clamp(0.0, 1.0)) {
            out.push(*BASES.choose(&mut rng).expect("BASES is non-empty"));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rates_are_a_no_op() {
        let dna = "AACCGGTTXACGTACGT";
        let rates = ErrorRates { substitution: 0.0, insertion: 0.0, deletion: 0.0 };
        assert_eq!(inject_errors(dna, rates, ErrorKind::All, 1), dna);
    }

    #[test]
    fn spacer_characters_are_never_mutated_even_at_rate_one() {
        let dna = "AAAAXCCCCXGGGG";
        let rates = ErrorRates { substitution: 1.0, insertion: 1.0, deletion: 1.0 };
        let mutated = inject_errors(dna, rates, ErrorKind::All, 7);
        assert_eq!(mutated.matches(SPACER).count(), dna.matches(SPACER).count());
    }

    #[test]
    fn subs_only_kind_never_changes_length() {
        let dna = "AACCGGTTACGTACGTAC";
        let rates = ErrorRates { substitution: 1.0, insertion: 1.0, deletion: 1.0 };
        let mutated = inject_errors(dna, rates, ErrorKind::Subs, 3);
        assert_eq!(mutated.len(), dna.len());
    }

    #[test]
    fn del_only_kind_never_inserts_or_substitutes_unseen_bases() {
        let dna = "ACGTACGTACGT";
        let rates = ErrorRates { substitution: 1.0, insertion: 1.0, deletion: 0.5 };
        let mutated = inject_errors(dna, rates, ErrorKind::Del, 11);
        assert!(mutated.len() <= dna.len());
        assert!(mutated.chars().all(|c| dna.contains(c)));
    }

    #[test]
    fn deterministic_given_same_seed() {
        let dna = "AACCGGTTACGTACGTAC";
        let rates = ErrorRates { substitution: 0.3, insertion: 0.1, deletion: 0.1 };
        let a = inject_errors(dna, rates, ErrorKind::All, 42);
        let b = inject_errors(dna, rates, ErrorKind::All, 42);
        assert_eq!(a, b);
    }
}
