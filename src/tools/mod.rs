//! Supporting tools: command line options, the chunk splitter, and the
//! byte-buffer file boundary.

pub mod chunker;
pub mod cli;
pub mod file_io;
