//! CLI command tree

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Narrate local novels chapter by chapter, remembering where you stopped
#[derive(Debug, Parser)]
#[command(name = "recite", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: recite.toml, then the user config dir)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Add a novel to the library and make it active
    Add {
        /// Path to a text or markdown file
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// List novels in the library
    List,

    /// Remove a novel by the index shown by `list`
    Remove {
        #[arg(value_name = "INDEX")]
        index: usize,
    },

    /// Make another novel active by the index shown by `list`
    Switch {
        #[arg(value_name = "INDEX")]
        index: usize,
    },

    /// List chapters of the active novel
    Chapters,

    /// Read from the last position, or from the start of a chapter
    #[command(visible_alias = "continue")]
    Read {
        /// 1-based chapter number
        #[arg(value_name = "CHAPTER")]
        chapter: Option<usize>,
    },

    /// Read the chapter after the last-read one
    Next,

    /// Read the chapter before the last-read one
    Prev,

    /// Show the active novel and the last-read position
    Where,

    /// Show settings, or toggle one (available: auto_next)
    Config {
        #[arg(value_name = "SETTING")]
        setting: Option<String>,
    },
}
