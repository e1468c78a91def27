//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::API_KEY_ENV;
use crate::git::DiffSelection;
use crate::render::DisplayMode;
use crate::viewer::ViewerOptions;

/// gitguy - commit messages and PR descriptions from your git diff
#[derive(Debug, Parser)]
#[command(name = "gitguy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base ref to compare from (e.g. main)
    #[arg(long, value_name = "REF")]
    pub ref_current: Option<String>,

    /// Ref with the incoming changes (e.g. feature-branch)
    #[arg(long, value_name = "REF")]
    pub ref_incoming: Option<String>,

    /// File to write the PR description to; {{ID}} becomes a random number
    #[arg(long, value_name = "FILE")]
    pub out_pr: Option<String>,

    /// Generate without the terminal UI (requires both refs)
    #[arg(long)]
    pub non_interactive: bool,

    /// OpenRouter API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Markdown template guiding the PR description's structure
    #[arg(long, value_name = "FILE")]
    pub pr_template: Option<PathBuf>,

    /// Model: deepseek-v3, deepseek-r1-0528, deepseek-r1, kimi-k2
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the working tree changes in the diff viewer
    Diff(DiffArgs),

    /// Manage stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct DiffArgs {
    /// Start in unified mode instead of side-by-side
    #[arg(long)]
    pub unified: bool,

    /// Show staged changes only
    #[arg(long, conflicts_with = "unstaged")]
    pub staged: bool,

    /// Show unstaged changes only
    #[arg(long)]
    pub unstaged: bool,

    /// Disable syntax highlighting
    #[arg(long)]
    pub no_syntax_highlighting: bool,

    /// Show whitespace-only changes
    #[arg(long)]
    pub whitespace: bool,

    /// Print the diff to stdout instead of opening the viewer
    #[arg(long, conflicts_with = "patch")]
    pub print: bool,

    /// Terminal width to lay out printed output for (defaults to the current terminal)
    #[arg(long, value_name = "COLUMNS", requires = "print")]
    pub width: Option<u16>,

    /// View a unified diff read from FILE ("-" for stdin) instead of the repository
    #[arg(long, value_name = "FILE", conflicts_with_all = ["staged", "unstaged"])]
    pub patch: Option<PathBuf>,
}

impl DiffArgs {
    pub fn selection(&self) -> DiffSelection {
        if self.staged {
            DiffSelection::Staged
        } else if self.unstaged {
            DiffSelection::Unstaged
        } else {
            DiffSelection::Default
        }
    }

    pub fn viewer_options(&self) -> ViewerOptions {
        ViewerOptions {
            mode: if self.unified {
                DisplayMode::Unified
            } else {
                DisplayMode::SideBySide
            },
            syntax_highlight: !self.no_syntax_highlighting,
            show_whitespace: self.whitespace,
            ..ViewerOptions::default()
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Store the OpenRouter API key in the config file
    SetKey {
        /// The API key
        key: String,
    },
}
