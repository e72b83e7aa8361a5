//! Typed error taxonomy for the DMR/RS codec core.

use thiserror::Error;

/// Primary error type returned by every encode/validate/correct function.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DmrError {
    /// A character outside {A,C,G,T} appeared in a segment.
    #[error("invalid base '{0}' in segment")]
    InvalidBase(char),

    /// A segment's base count was odd where an even count is required.
    #[error("segment has odd base length {0}")]
    OddLength(usize),

    /// Strict decode could not place a two-mer within the DMR scheme.
    #[error("two-mer at position {0} is not reachable under the DMR scheme")]
    NotInScheme(usize),

    /// All correction levels exhausted without a verified candidate.
    #[error("segment {0} could not be recovered at any correction level")]
    IrrecoverableSegment(usize),

    /// RS parameter derivation was given a contradictory configuration.
    #[error("invalid RS configuration: c={c}, c_min={c_min}, l_min={l_min}")]
    InvalidConfig { c: u16, c_min: u16, l_min: usize },

    /// The underlying RS codec rejected or failed to decode a codeword.
    #[error("RS codec error: {0}")]
    RsCodecError(String),

    /// An empty segment was passed where at least one two-mer is required.
    #[error("segment is empty")]
    EmptySegment,
}

/// Result alias used throughout the codec core.
pub type Result<T> = std::result::Result<T, DmrError>;
