//! Command-line interface definitions for the ethics board.
//!
//! No argument is required; a bare invocation runs the `news` profile with
//! default settings. Some options can also be set through environment
//! variables.

use std::path::PathBuf;

use clap::Parser;

use crate::profiles::ProfileName;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # News headlines into data/stories.json
/// ethics_board
///
/// # Crossref works, polite-pool contact, custom output
/// ethics_board --profile research --mailto ops@example.org -o site/research.json
///
/// # Settings file
/// ethics_board -c board.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Pipeline variant to run
    #[arg(short, long, value_enum, default_value_t = ProfileName::News)]
    pub profile: ProfileName,

    /// Output file (defaults to <output_dir>/stories.json or research.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum stories kept per category
    #[arg(long)]
    pub max_per_category: Option<usize>,

    /// User-Agent header sent with every request
    #[arg(long, env = "ETHICS_BOARD_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Contact address for the Crossref polite pool
    #[arg(long, env = "CROSSREF_MAILTO")]
    pub mailto: Option<String>,
}
