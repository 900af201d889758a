use no_space_left::{bounded_sum, read_transcript, Cli};

use std::io;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.setup_tracing();

    let tree = read_transcript(io::stdin().lock())?;
    let cs = bounded_sum(&tree, cli.config.size_threshold)?;

    println!("{cs}");

    Ok(())
}
