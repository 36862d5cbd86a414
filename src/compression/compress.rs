//! File-level compression: read the input, split it, fan the chunks out to
//! the worker pool, and write the packed archive.

use log::{debug, info};

use super::{archive, parallel::ParallelCompressor};
use crate::error::Result;
use crate::huffman_coding::Huffman;
use crate::tools::chunker;
use crate::tools::cli::Opts;
use crate::tools::file_io;

/// File extension appended to compressed output.
pub const EXTENSION: &str = ".hfz";

/// Compress the file named in opts into `<file>.hfz`.
pub fn compress(opts: &Opts) -> Result<()> {
    let data = file_io::read_file(&opts.file)?;
    info!("Read {} bytes from {}", data.len(), &opts.file);

    let chunks = chunker::split(&data, opts.chunk_size)?;
    debug!(
        "Split into {} chunks of up to {} bytes",
        chunks.len(),
        opts.chunk_size
    );

    let orchestrator = ParallelCompressor::<Huffman>::new(opts.worker_threads())?;
    let encoded = orchestrator.compress_chunks(chunks)?;
    let packed = archive::pack(&encoded)?;

    info!(
        "Compressed {} bytes to {} ({:.1}%)",
        data.len(),
        packed.len(),
        if data.is_empty() {
            100.0
        } else {
            packed.len() as f64 * 100.0 / data.len() as f64
        }
    );

    let out_name = format!("{}{}", &opts.file, EXTENSION);
    file_io::write_file(&out_name, &packed, opts.force)?;
    info!("Wrote {}", out_name);
    Ok(())
}
