//! C11: spacer framing. Encoded segments never contain the literal `X`
//! character, so a run of one-or-more `X`s unambiguously delimits them in
//! a transmitted stream.

pub const SPACER: char = 'X';

/// Join `segments` with a single spacer character between each pair.
pub fn join_with_spacer(segments: &[String]) -> String {
    segments.join(&SPACER.to_string())
}

/// Split `stream` on runs of one-or-more spacer characters, discarding any
/// empty parts a repeated spacer run produces. Segment order in the
/// returned vector matches the order of appearance in `stream`; the
/// caller (C8) is responsible for associating a hypothesised segment
/// index with each position.
pub fn split_on_spacer(stream: &str) -> Vec<String> {
    stream
        .split(SPACER)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_for_spacer_free_segments() {
        let segments = vec!["AACCGGTT".to_string(), "TTGGCCAA".to_string(), "ACGTACGT".to_string()];
        let framed = join_with_spacer(&segments);
        assert_eq!(framed, "AACCGGTTXTTGGCCAAXACGTACGT");
        assert_eq!(split_on_spacer(&framed), segments);
    }

    #[test]
    fn repeated_spacer_runs_collapse_and_drop_empties() {
        let framed = "AAAAXXXCCCCXXGGGG";
        assert_eq!(split_on_spacer(framed), vec!["AAAA", "CCCC", "GGGG"]);
    }

    #[test]
    fn leading_and_trailing_spacers_are_discarded() {
        assert_eq!(split_on_spacer("XAAAAX"), vec!["AAAA"]);
    }
}
