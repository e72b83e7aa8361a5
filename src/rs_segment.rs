//! C4 + C12: the Reed-Solomon parameter derivation and the adapter around
//! the third-party systematic RS implementation.

use reed_solomon::{Decoder, Encoder};
use tracing::warn;

use crate::errors::{DmrError, Result};

/// `recalculate(c, c_min, l_min) -> (c', payload)`.
///
/// `c` is the outer code's configured parity-per-255 rate; `c_min` and
/// `l_min` are caller-supplied lower bounds on the downsized per-segment
/// parity count and segment length (in bytes) respectively. See
/// DESIGN.md for the Open Question decision on the `l_min == 0, c_min > 0`
/// fallback branch, which intentionally leaves `c'` at its degenerate
/// default even after `c_min` is raised.
pub fn recalculate(c: u16, c_min: u16, l_min: usize) -> Result<(u16, usize)> {
    if c == 0 || c as usize >= 255 {
        return Err(DmrError::InvalidConfig { c, c_min, l_min });
    }

    let mut c_min = c_min;
    if c_min > c {
        warn!(
            c,
            c_min, "c_min exceeds the configured codec size; demoting c_min to 0"
        );
        c_min = 0;
    }

    let (c_prime, payload): (u16, i64) = if l_min == 0 {
        if c_min == 0 {
            let payload = (255 - c as i64) / c as i64;
            (1, payload)
        } else {
            let payload = (c_min as i64 * (255 - c as i64)) / c as i64;
            if payload > 0 {
                (c_min, payload)
            } else {
                let maximal_downsized_codec =
                    ((c as f64) / (255.0 - c as f64)).ceil().max(1.0) as u16;
                warn!(
                    from = c_min,
                    to = maximal_downsized_codec,
                    "c_min too large for this codec size (payload would be zero); lowering"
                );
                let payload = (maximal_downsized_codec as i64 * (255 - c as i64)) / c as i64;
                // The reference implementation leaves the returned codec
                // size at its degenerate default of 1 here rather than the
                // just-recomputed `maximal_downsized_codec` — preserved
                // verbatim, see DESIGN.md.
                (1, payload)
            }
        }
    } else if c_min == 0 {
        let m = ((l_min as i64 * c as i64) + 254) / 255; // ceil(l_min*c/255)
        let m = m.max(1) as u16;
        let mut payload = l_min as i64 - m as i64;
        if m == 1 && l_min == 1 {
            payload = 1;
        }
        (m, payload)
    } else {
        let m = (((l_min as i64 * c as i64) + 254) / 255).max(1) as u16;
        if c_min < m {
            warn!(from = c_min, to = m, "c_min too small for l_min; raising");
            (m, l_min as i64 - m as i64)
        } else {
            (c_min, l_min as i64 - m as i64)
        }
    };

    if payload <= 0 {
        return Err(DmrError::InvalidConfig { c, c_min, l_min });
    }

    Ok((c_prime.max(1), payload as usize))
}

/// Wraps a systematic, error-correcting Reed-Solomon codec over GF(256)
/// for a fixed parity-symbol count `c'`, matching the `encode`/`decode`/
/// `check` interface §4.4 and §6 require.
pub struct RsSegmentCodec {
    c_prime: usize,
    encoder: Encoder,
    decoder: Decoder,
}

impl RsSegmentCodec {
    pub fn new(c_prime: usize) -> Result<Self> {
        if c_prime == 0 || c_prime > 254 {
            return Err(DmrError::InvalidConfig {
                c: c_prime as u16,
                c_min: 0,
                l_min: 0,
            });
        }
        Ok(Self {
            c_prime,
            encoder: Encoder::new(c_prime),
            decoder: Decoder::new(c_prime),
        })
    }

    pub fn c_prime(&self) -> usize {
        self.c_prime
    }

    /// Append `c'` parity bytes to `payload`, producing a codeword.
    pub fn encode_bytes(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() + self.c_prime > 255 {
            return Err(DmrError::InvalidConfig {
                c: self.c_prime as u16,
                c_min: 0,
                l_min: payload.len(),
            });
        }
        let buffer = self.encoder.encode(payload);
        Ok(buffer.iter().copied().collect())
    }

    /// Correct and strip the parity bytes of `codeword`, returning the
    /// payload and the byte positions that differed from the input
    /// (the errata).
    pub fn decode_bytes(&self, codeword: &[u8]) -> Result<(Vec<u8>, Vec<usize>)> {
        let corrected = self
            .decoder
            .correct(codeword, None)
            .map_err(|e| DmrError::RsCodecError(format!("{e:?}")))?;

        let corrected_bytes: Vec<u8> = corrected.data().iter().chain(corrected.ecc()).copied().collect();
        let errata = codeword
            .iter()
            .zip(corrected_bytes.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
            .collect();

        Ok((corrected.data().to_vec(), errata))
    }

    /// Re-validate a codeword without returning the corrected payload.
    pub fn check_bytes(&self, codeword: &[u8]) -> bool {
        self.decode_bytes(codeword).is_ok()
    }

    /// `(max correctable errors, max correctable erasures)` for this parity count.
    pub fn max_errata(&self) -> (usize, usize) {
        (self.c_prime / 2, self.c_prime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recalculate_l_min_positive_c_min_zero() {
        let (c_prime, payload) = recalculate(32, 0, 100).unwrap();
        assert!(c_prime >= 1);
        assert_eq!(c_prime as usize + payload, 100);
    }

    #[test]
    fn recalculate_raises_small_c_min() {
        let (c_prime, payload) = recalculate(32, 1, 100).unwrap();
        assert!(c_prime as usize + payload == 100);
        assert!(c_prime >= 1);
    }

    #[test]
    fn recalculate_demotes_c_min_above_c() {
        let (c_prime, payload) = recalculate(10, 250, 100).unwrap();
        assert!(c_prime >= 1 && payload >= 1);
    }

    #[test]
    fn encode_decode_round_trip_with_no_errors() {
        let codec = RsSegmentCodec::new(8).unwrap();
        let payload = b"hello dna storage";
        let codeword = codec.encode_bytes(payload).unwrap();
        let (decoded, errata) = codec.decode_bytes(&codeword).unwrap();
        assert_eq!(decoded, payload);
        assert!(errata.is_empty());
    }

    #[test]
    fn decode_corrects_within_capacity() {
        let codec = RsSegmentCodec::new(8).unwrap();
        let payload = b"another test payload!!";
        let mut codeword = codec.encode_bytes(payload).unwrap();
        codeword[2] ^= 0xFF;
        let (decoded, errata) = codec.decode_bytes(&codeword).unwrap();
        assert_eq!(decoded, payload);
        assert!(!errata.is_empty());
    }
}
