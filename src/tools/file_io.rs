//! The byte-buffer boundary: whole-file load and store. I/O failures pass
//! through untouched; nothing here retries or reinterprets them.

use std::fs;
use std::io;
use std::path::Path;

use log::warn;

use crate::error::Result;

/// Read a whole file into a byte buffer.
pub fn read_file(path: &str) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

/// Write a byte buffer to a file. Refuses to overwrite an existing file
/// unless `force` is set.
pub fn write_file(path: &str, data: &[u8], force: bool) -> Result<()> {
    if !force && Path::new(path).exists() {
        warn!("{} exists; use --force to overwrite.", path);
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", path),
        )
        .into());
    }
    fs::write(path, data)?;
    Ok(())
}
