use no_space_left::{min_deletion, read_transcript, Cli};

use std::io;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.setup_tracing();

    let tree = read_transcript(io::stdin().lock())?;
    let cs = min_deletion(
        &tree,
        cli.config.disk_capacity,
        cli.config.required_free_space,
    )?;

    println!("{cs}");

    Ok(())
}
