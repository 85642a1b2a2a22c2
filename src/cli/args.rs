//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Materialize directory hierarchies and layout-described trees
#[derive(Parser, Debug)]
#[command(name = "treemgr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding the local .treemgr.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a directory as tree
    Dump {
        /// Directory (default: cwd)
        #[arg(value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
        /// Levels to materialize (default: max_depth setting)
        #[arg(long)]
        depth: Option<usize>,
        /// Show all node attributes
        #[arg(short, long)]
        all: bool,
    },

    /// Resolve a node path inside a directory tree
    Get {
        /// Directory to browse
        #[arg(value_hint = ValueHint::DirPath)]
        dir: PathBuf,
        /// Node path: `/a/b`, or `0:1` with --index
        path: String,
        /// Interpret path as index path
        #[arg(short, long)]
        index: bool,
        /// Populate levels on demand while searching
        #[arg(short, long)]
        lazy: bool,
    },

    /// Build and show the tree described by a layout file
    Layout {
        /// Layout file, or name of a layout in layout_dir
        layout: String,
        /// Only show the subtree at this name path
        #[arg(short, long)]
        path: Option<String>,
        /// Show all node attributes
        #[arg(short, long)]
        all: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print a config template
    Template,
}
