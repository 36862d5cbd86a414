//Enable more cargo lint tests
#![warn(rust_2018_idioms)]

use clap::Parser;
use log::{error, info};
use simplelog::{Config, TermLogger, TerminalMode};

use huffzip::compression::{compress::compress, decompress::decompress};
use huffzip::error::Result;
use huffzip::tools::cli::{Mode, Opts};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    let opts = Opts::parse();

    // Available log levels are Error, Warn, Info, Debug, Trace
    TermLogger::init(
        opts.log_level(),
        Config::default(),
        TerminalMode::Stdout,
        simplelog::ColorChoice::AlwaysAnsi,
    )
    .unwrap();

    if let Err(e) = run(&opts) {
        error!("{}", e);
        std::process::exit(1);
    }
    info!("Done.\n");
}

fn run(opts: &Opts) -> Result<()> {
    opts.validate()?;
    match opts.op_mode() {
        Mode::Zip => compress(opts),
        Mode::Unzip => decompress(opts),
    }
}
