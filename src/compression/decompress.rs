//! File-level decompression: read the archive, decode the chunks in
//! parallel, and write the reassembled buffer.

use log::info;

use super::compress::EXTENSION;
use super::{archive, parallel::ParallelCompressor};
use crate::error::Result;
use crate::huffman_coding::Huffman;
use crate::tools::cli::Opts;
use crate::tools::file_io;

/// Decompress the archive named in opts. Output strips the `.hfz`
/// extension when present, otherwise gains `.out`.
pub fn decompress(opts: &Opts) -> Result<()> {
    let packed = file_io::read_file(&opts.file)?;
    info!("Read {} bytes from {}", packed.len(), &opts.file);

    let encoded = archive::unpack(&packed)?;
    info!("Archive holds {} chunks", encoded.len());

    let orchestrator = ParallelCompressor::<Huffman>::new(opts.worker_threads())?;
    let data = orchestrator.decompress_chunks(encoded)?;

    let out_name = output_name(&opts.file);
    file_io::write_file(&out_name, &data, opts.force)?;
    info!("Wrote {} bytes to {}", data.len(), out_name);
    Ok(())
}

fn output_name(input: &str) -> String {
    match input.strip_suffix(EXTENSION) {
        Some(stem) => stem.to_string(),
        None => format!("{}.out", input),
    }
}

#[cfg(test)]
mod test {
    use super::output_name;

    #[test]
    fn output_name_test() {
        assert_eq!(output_name("data.txt.hfz"), "data.txt");
        assert_eq!(output_name("data.txt"), "data.txt.out");
    }
}
