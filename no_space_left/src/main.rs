use std::io;

use anyhow::Result;
use clap::Parser;
use no_space_left::{answer, read_transcript, Cli};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.setup_tracing();
    debug!("Parsed CLI arguments: {cli:?}");

    let tree = read_transcript(io::stdin().lock())?;
    if cli.dump {
        eprint!("{tree}");
    }

    let answers = answer(&tree, &cli.config)?;

    println!("{}", answers.bounded_sum);
    println!("{}", answers.min_deletion);

    Ok(())
}
