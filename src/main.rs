// src/main.rs
// DMR-CODEC: a DNA storage codec combining an outer Reed-Solomon code with
// the Dynamic Mapping Rule. Entry point for the command line driver.

mod cli;

use std::collections::HashMap;
use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use dmr_codec::config::Config;
use dmr_codec::rs_segment::RsSegmentCodec;
use dmr_codec::tables::{MappingTables, TwoMer};
use dmr_codec::{bits, image_io, injector, mask, parallel, pipeline, plain_codec, segment, spacer, translator};

/// Default chunk size, in bytes, for correction modes that bypass the
/// outer RS codec entirely (`No`/`No_with_spacer`) and so have no
/// `recalculate`-derived payload length to chunk by.
const DEFAULT_CHUNK_LEN: usize = 32;

/// Fixed-size metadata segment prepended to every encoded stream, itself
/// encoded with the plain 2-bit codec (never RS, never DMR, never masked)
/// so it can be read back before anything else is known. The reference
/// implementation passes image dimensions as out-of-band CLI/code
/// parameters instead of embedding them; this header is this crate's own
/// enrichment so `decode` is self-contained (see DESIGN.md).
struct Header {
    data_len: u64,
    is_image: bool,
    width: u32,
    height: u32,
}

const HEADER_BYTE_LEN: usize = 8 + 1 + 4 + 4;

impl Header {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_BYTE_LEN);
        out.extend_from_slice(&self.data_len.to_be_bytes());
        out.push(self.is_image as u8);
        out.extend_from_slice(&self.width.to_be_bytes());
        out.extend_from_slice(&self.height.to_be_bytes());
        out
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        anyhow::ensure!(bytes.len() == HEADER_BYTE_LEN, "truncated stream header");
        let data_len = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
        let is_image = bytes[8] != 0;
        let width = u32::from_be_bytes(bytes[9..13].try_into().unwrap());
        let height = u32::from_be_bytes(bytes[13..17].try_into().unwrap());
        Ok(Header { data_len, is_image, width, height })
    }
}

/// Per-segment correction levels used and counted, for `simulate`'s
/// reporting: a clean segment accepted by the initial scan has no level at
/// all, an escalated one was resolved by L0/L1/L2, and a segment with no
/// verified candidate at any level is tallied as failed.
#[derive(Debug, Default)]
struct DecodeStats {
    total_segments: usize,
    failed_segments: usize,
    level_histogram: HashMap<String, usize>,
}

fn chunk_len_and_codec(cfg: &Config) -> Result<(Option<RsSegmentCodec>, usize)> {
    if cfg.mode.uses_rs() {
        let (c_prime, payload) = dmr_codec::rs_segment::recalculate(cfg.codec, cfg.c_min, cfg.l_min)?;
        let rs = RsSegmentCodec::new(c_prime as usize)?;
        Ok((Some(rs), payload))
    } else {
        let payload = if cfg.l_min > 0 { cfg.l_min } else { DEFAULT_CHUNK_LEN };
        Ok((None, payload))
    }
}

/// Encode `raw` (the file's real bytes) under `cfg`, returning the full
/// framed DNA text stream: a fixed-length header segment, a spacer, then
/// the body segments framed per the mode's own convention.
fn encode_pipeline(
    cfg: &Config,
    tables: &MappingTables,
    raw: &[u8],
    is_image: bool,
    width: u32,
    height: u32,
) -> Result<String> {
    let header = Header { data_len: raw.len() as u64, is_image, width, height };
    let header_dna = plain_codec::encode(&header.to_bytes());

    let masked = mask::apply_mask(raw, cfg.seed);
    let (rs, chunk_len) = chunk_len_and_codec(cfg)?;
    let chunks = segment::chunk_payload(&masked, chunk_len);
    debug!(chunks = chunks.len(), chunk_len, "segmented payload for encoding");

    let dna_segments: Vec<String> = if cfg.mode.uses_dmr() && rs.is_some() {
        parallel::encode_segments_parallel(&chunks, rs.as_ref().unwrap(), tables)?
    } else {
        chunks
            .par_iter()
            .enumerate()
            .map(|(i, chunk)| -> dmr_codec::errors::Result<String> {
                let codeword = match &rs {
                    Some(rs) => rs.encode_bytes(chunk)?,
                    None => chunk.clone(),
                };
                if cfg.mode.uses_dmr() {
                    let bit_vec = bits::bytes_to_bits(&codeword);
                    let s = i % 4;
                    let seq = translator::encode(&bit_vec, s, tables)?;
                    Ok(translator::to_dna_string(&seq))
                } else {
                    Ok(plain_codec::encode(&codeword))
                }
            })
            .collect::<dmr_codec::errors::Result<Vec<_>>>()?
    };

    let body = if cfg.mode.uses_spacer() {
        spacer::join_with_spacer(&dna_segments)
    } else {
        dna_segments.concat()
    };

    Ok(spacer::join_with_spacer(&[header_dna, body]))
}

/// Decode `stream` (as produced by [`encode_pipeline`]) under `cfg`,
/// returning the recovered bytes, the image metadata the header carried,
/// and recovery statistics.
fn decode_pipeline(
    cfg: &Config,
    tables: &MappingTables,
    stream: &str,
) -> Result<(Vec<u8>, bool, u32, u32, DecodeStats)> {
    let split_at = stream.find(spacer::SPACER).context("stream has no header/body spacer")?;
    let header_dna = &stream[..split_at];
    let rest = &stream[split_at + spacer::SPACER.len_utf8()..];

    let header = Header::from_bytes(&plain_codec::decode(header_dna)?)?;

    let (rs, chunk_len) = chunk_len_and_codec(cfg)?;
    let codeword_len = chunk_len + rs.as_ref().map(|r| r.c_prime()).unwrap_or(0);
    // Each codeword byte is 8 bits; DMR emits one base per bit (one
    // two-mer per 2 bits), the plain codec emits one base per 2 bits.
    let dna_segment_len = if cfg.mode.uses_dmr() { codeword_len * 8 } else { codeword_len * 4 };

    let segment_strings: Vec<String> = if cfg.mode.uses_spacer() {
        spacer::split_on_spacer(rest)
    } else if dna_segment_len == 0 {
        Vec::new()
    } else {
        rest.chars()
            .collect::<Vec<char>>()
            .chunks(dna_segment_len)
            .map(|c| c.iter().collect())
            .collect()
    };

    let mut stats = DecodeStats { total_segments: segment_strings.len(), ..Default::default() };

    let mut payload_chunks: Vec<(u64, Vec<u8>)> = if cfg.mode.uses_dmr() {
        let segments: Vec<(u64, Vec<TwoMer>)> = segment_strings
            .iter()
            .enumerate()
            .filter_map(|(i, s)| translator::from_dna_string(s).ok().map(|seq| (i as u64, seq)))
            .collect();

        let rs = rs.context("DMR modes always carry an outer RS codec")?;
        let result = pipeline::run_pipeline(&segments, &rs, tables);

        for r in &result.recovered {
            let label = match r.level_used {
                None => "initial_scan".to_string(),
                Some(level) => format!("{level:?}"),
            };
            *stats.level_histogram.entry(label).or_insert(0) += 1;
        }

        let mut out: Vec<(u64, Vec<u8>)> =
            result.recovered.into_iter().map(|r| (r.segment_index, r.payload)).collect();

        for &idx in &result.failed {
            warn!(segment_index = idx, "segment irrecoverable at every level; falling back to tolerant decode");
            stats.failed_segments += 1;
            *stats.level_histogram.entry("tolerant_fallback".to_string()).or_insert(0) += 1;

            let s = (idx % 4) as usize;
            if let Some((_, seq)) = segments.iter().find(|(i, _)| *i == idx) {
                let tolerant_bits = translator::decode_tolerant(seq, s, idx, cfg.seed, tables);
                let mut codeword = bits::bits_to_bytes(&tolerant_bits);
                codeword.resize(codeword_len, 0);
                let payload = match rs.decode_bytes(&codeword) {
                    Ok((p, _)) => p,
                    Err(_) => codeword.into_iter().take(chunk_len).collect(),
                };
                out.push((idx, payload));
            }
        }
        out
    } else {
        segment_strings
            .iter()
            .enumerate()
            .map(|(i, s)| -> Result<(u64, Vec<u8>)> {
                let codeword = plain_codec::decode(s)?;
                let payload = match &rs {
                    Some(rs) => match rs.decode_bytes(&codeword) {
                        Ok((p, _)) => {
                            *stats.level_histogram.entry("rs_only".to_string()).or_insert(0) += 1;
                            p
                        }
                        Err(_) => {
                            stats.failed_segments += 1;
                            codeword.into_iter().take(chunk_len).collect()
                        }
                    },
                    None => {
                        *stats.level_histogram.entry("no_rs".to_string()).or_insert(0) += 1;
                        codeword
                    }
                };
                Ok((i as u64, payload))
            })
            .collect::<Result<Vec<_>>>()?
    };

    payload_chunks.sort_by_key(|(idx, _)| *idx);
    let masked_recovered: Vec<u8> = payload_chunks.into_iter().flat_map(|(_, p)| p).collect();
    let mut truncated = masked_recovered;
    truncated.truncate(header.data_len as usize);
    let recovered = mask::remove_mask(&truncated, cfg.seed);

    Ok((recovered, header.is_image, header.width, header.height, stats))
}

fn run_encode(cfg: &Config, tables: &MappingTables, input: &str, output: &str, image: bool) -> Result<()> {
    let (raw, is_image, width, height) = if image {
        let (packed, w, h) = image_io::read_thresholded(input)?;
        (packed, true, w, h)
    } else {
        let bytes = fs::read(input).with_context(|| format!("failed to read input: {input}"))?;
        (bytes, false, 0, 0)
    };

    info!(input, bytes = raw.len(), is_image, "encoding");
    let stream = encode_pipeline(cfg, tables, &raw, is_image, width, height)?;
    fs::write(output, stream.as_bytes()).with_context(|| format!("failed to write output: {output}"))?;
    info!(output, "encode complete");
    Ok(())
}

fn run_decode(cfg: &Config, tables: &MappingTables, input: &str, output: &str) -> Result<()> {
    let stream = fs::read_to_string(input).with_context(|| format!("failed to read input: {input}"))?;
    let stream = stream.trim();

    let (bytes, is_image, width, height, stats) = decode_pipeline(cfg, tables, stream)?;
    info!(
        segments = stats.total_segments,
        failed = stats.failed_segments,
        "decode complete"
    );

    if is_image {
        image_io::write_thresholded(output, &bytes, width, height)?;
    } else {
        fs::write(output, &bytes).with_context(|| format!("failed to write output: {output}"))?;
    }
    Ok(())
}

fn run_simulate(
    cfg: &Config,
    tables: &MappingTables,
    input: &str,
    rates: injector::ErrorRates,
    kind: injector::ErrorKind,
    trials: u32,
) -> Result<()> {
    let raw = fs::read(input).with_context(|| format!("failed to read input: {input}"))?;
    let clean_stream = encode_pipeline(cfg, tables, &raw, false, 0, 0)?;

    let header_end = clean_stream.find(spacer::SPACER).context("stream has no header/body spacer")?;
    let header_part = &clean_stream[..=header_end];
    let body = &clean_stream[header_end + 1..];

    let mut bytes_total = 0u64;
    let mut bytes_recovered_total = 0u64;
    let mut aggregate_histogram: HashMap<String, usize> = HashMap::new();

    for trial in 0..trials {
        let mutated_body = injector::inject_errors(body, rates, kind, cfg.seed ^ trial as u64);
        let mutated_stream = format!("{header_part}{mutated_body}");

        match decode_pipeline(cfg, tables, &mutated_stream) {
            Ok((recovered, _, _, _, stats)) => {
                let matching = recovered.iter().zip(raw.iter()).filter(|(a, b)| a == b).count();
                bytes_total += raw.len() as u64;
                bytes_recovered_total += matching as u64;
                for (k, v) in stats.level_histogram {
                    *aggregate_histogram.entry(k).or_insert(0) += v;
                }
                info!(
                    trial,
                    bytes_matching = matching,
                    bytes_total = raw.len(),
                    failed_segments = stats.failed_segments,
                    "trial complete"
                );
            }
            Err(e) => {
                warn!(trial, error = %e, "trial failed to decode at all");
                bytes_total += raw.len() as u64;
            }
        }
    }

    println!("Simulation complete over {trials} trial(s).");
    println!(
        "  Bytes recovered: {bytes_recovered_total}/{bytes_total} ({:.2}%)",
        100.0 * bytes_recovered_total as f64 / bytes_total.max(1) as f64
    );
    println!("  Level histogram (aggregate across trials):");
    let mut entries: Vec<_> = aggregate_histogram.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    for (level, count) in entries {
        println!("    {level}: {count}");
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.jobs)
        .build_global()
        .map_err(|e| anyhow::anyhow!("failed to configure thread pool: {e}"))?;
    info!(threads = rayon::current_num_threads(), "thread pool configured");

    let tables = match &cli.table {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("failed to read mapping table: {path}"))?;
            MappingTables::from_json(&json)?
        }
        None => MappingTables::load_default()?,
    };

    let cfg = Config::new(cli.mode, cli.codec, cli.c_min, cli.l_min, cli.seed, cli.jobs);

    match &cli.command {
        Commands::Encode { input, output, image } => run_encode(&cfg, &tables, input, output, *image)?,
        Commands::Decode { input, output } => run_decode(&cfg, &tables, input, output)?,
        Commands::Simulate { input, subs, ins, del, error, trials } => {
            let rates = injector::ErrorRates { substitution: *subs, insertion: *ins, deletion: *del };
            run_simulate(&cfg, &tables, input, rates, (*error).into(), *trials)?
        }
    }

    Ok(())
}
