pub mod config;
pub mod error;
pub mod input;
pub mod path;
pub mod query;
pub mod transcript;
pub mod tree;

pub use config::{Cli, Config, LogLevel};
pub use error::FsError;
pub use input::read_transcript;
pub use path::DirPath;
pub use query::{
    answer, bounded_sum, min_deletion, size_smallest, size_to_delete, solve, Answers,
};
pub use transcript::{build_tree, Line, Transcript};
pub use tree::{DirEntry, DirectoryTree};
