//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::domain::DanglingPolicy;

/// Convert between flat parent-linked JSON rows and nested trees
#[derive(Parser, Debug)]
#[command(name = "rowtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directory holding a local .rowtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build nested trees from a flat JSON array
    Build {
        /// Flat JSON file ("-" for stdin)
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Write result here instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        #[command(flatten)]
        fields: FieldArgs,
        #[command(flatten)]
        link: LinkArgs,
        #[command(flatten)]
        format: FormatArgs,
    },

    /// Flatten nested trees into a pre-order JSON array
    Flatten {
        /// Tree JSON file ("-" for stdin)
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Write result here instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        #[command(flatten)]
        fields: FieldArgs,
        #[command(flatten)]
        format: FormatArgs,
    },

    /// Draw the hierarchy of a flat JSON array
    Show {
        /// Flat JSON file ("-" for stdin)
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Field used as node label (falls back to the id)
        #[arg(short, long)]
        label: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
        #[command(flatten)]
        link: LinkArgs,
    },

    /// Summarize roots, nodes, depth and leaves of a flat JSON array
    Stats {
        /// Flat JSON file ("-" for stdin)
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        #[command(flatten)]
        fields: FieldArgs,
        #[command(flatten)]
        link: LinkArgs,
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

/// Field name overrides
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Field holding the record id
    #[arg(long)]
    pub id_field: Option<String>,
    /// Field holding the parent reference
    #[arg(long)]
    pub parent_field: Option<String>,
    /// Field carrying nested children
    #[arg(long)]
    pub children_field: Option<String>,
}

/// Root sentinel and dangling reference handling
#[derive(Args, Debug, Default, Clone)]
pub struct LinkArgs {
    /// Parent value marking a root (integers are matched as numbers)
    #[arg(long, conflicts_with = "no_root")]
    pub root: Option<String>,
    /// Only records with a missing or null parent are roots
    #[arg(long)]
    pub no_root: bool,
    /// Unresolvable parent references: reject or drop
    #[arg(long, value_name = "POLICY")]
    pub on_dangling: Option<DanglingPolicy>,
}

/// Output formatting
#[derive(Args, Debug, Default, Clone)]
pub struct FormatArgs {
    /// Emit single-line JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented config template
    Template,
    /// Show config file locations
    Path,
}
