//! Command-line arguments

use std::path::PathBuf;
use clap::{Parser, ValueEnum};
use flamegraph_chart::ChartConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented bars in the terminal
    Text,
    /// Chart document for a browser flamegraph
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "spanscope")]
#[command(about = "Explore trace exports as a flamegraph", long_about = None)]
pub struct Args {
    /// Trace export files, merged in the order given
    #[arg(value_name = "FILE", required_unless_present = "interactive")]
    pub files: Vec<PathBuf>,

    /// Chart configuration (TOML)
    #[arg(short, long, env = "SPANSCOPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Highlight spans whose name matches this regular expression
    #[arg(short, long)]
    pub search: Option<String>,

    /// Case-insensitive search
    #[arg(short, long)]
    pub ignore_case: bool,

    /// Zoom into the span with this id
    #[arg(long, value_name = "ID")]
    pub zoom: Option<String>,

    /// Chart width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print per-name statistics instead of the chart
    #[arg(long)]
    pub stats: bool,

    /// Read commands from stdin
    #[arg(long)]
    pub interactive: bool,

    /// Debug-level console logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Command-line flags win over the config file
    pub fn apply_overrides(&self, config: &mut ChartConfig) {
        if self.ignore_case {
            config.ignore_case = true;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
    }
}
