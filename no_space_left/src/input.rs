use std::io::BufRead;

use anyhow::{Context, Result};
use tracing::info;

use crate::transcript::Transcript;
use crate::tree::DirectoryTree;

pub fn read_transcript(reader: impl BufRead) -> Result<DirectoryTree> {
    let mut transcript = Transcript::new();

    for (n, line) in reader.lines().enumerate() {
        let line = line.context("Unable to read transcript")?;
        if let Err(e) = transcript.process(&line) {
            if let Some(report) = e.render_line() {
                eprintln!("{report}");
            }
            return Err(e).with_context(|| format!("Transcript line {}", n + 1));
        }
    }

    info!("reconstructed {} directories", transcript.tree().len());
    Ok(transcript.into_tree())
}
