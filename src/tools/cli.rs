//! Command line interpretation - uses the external CLAP crate.

use std::fmt::{Display, Formatter};

use clap::Parser;

use crate::error::{HuffzipError, Result};

/// Compress or decompress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// huffzip, a chunked parallel Huffman file compressor.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "huffzip, a chunked parallel Huffman file compressor.",
    long_about = "
    Splits the input into fixed-size chunks and Huffman-codes each chunk
    independently on a pool of worker threads. Every chunk carries its own
    code tree, so decompression is parallel too."
)]
pub struct Opts {
    /// File to process
    #[clap()]
    pub file: String,

    /// Decompress instead of compress
    #[clap(short = 'd', long = "decompress")]
    pub decompress: bool,

    /// Chunk size in bytes used to split the input
    #[clap(short = 'c', long = "chunk-size", default_value_t = 65536)]
    pub chunk_size: usize,

    /// Worker threads; 0 means one per available core
    #[clap(short = 't', long = "threads", default_value_t = 0)]
    pub threads: usize,

    /// Overwrite existing output files
    #[clap(short = 'f', long = "force")]
    pub force: bool,

    /// Verbosity. -v shows progress, -vvv is chatty
    #[clap(short = 'v', parse(from_occurrences))]
    pub verbose: usize,
}

impl Opts {
    pub fn op_mode(&self) -> Mode {
        if self.decompress {
            Mode::Unzip
        } else {
            Mode::Zip
        }
    }

    /// The worker pool size: the -t value, or available hardware
    /// parallelism when unset.
    pub fn worker_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }

    /// Reject settings no stage downstream can work with.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(HuffzipError::InvalidConfiguration(
                "chunk size must be at least 1 byte".to_string(),
            ));
        }
        if self.chunk_size > u32::MAX as usize {
            return Err(HuffzipError::InvalidConfiguration(
                "chunk size must fit in 32 bits".to_string(),
            ));
        }
        Ok(())
    }

    /// Map the -v count onto a log level.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn opts(args: &[&str]) -> Opts {
        Opts::parse_from(std::iter::once("huffzip").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_test() {
        let o = opts(&["input.bin"]);
        assert_eq!(o.op_mode(), Mode::Zip);
        assert_eq!(o.chunk_size, 65536);
        assert!(o.worker_threads() >= 1);
        assert!(o.validate().is_ok());
    }

    #[test]
    fn decompress_flag_test() {
        let o = opts(&["-d", "input.bin.hfz"]);
        assert_eq!(o.op_mode(), Mode::Unzip);
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let o = opts(&["-c", "0", "input.bin"]);
        assert!(o.validate().is_err());
    }
}
