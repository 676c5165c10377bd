//! Configuration management for the `dm3` command-line tool.
//!
//! This module provides the CLI definition, which supports:
//! - Subcommands for metadata, tag dumps and file checks
//! - Environment variables with `DM3_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use dm3_reader::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.into_command() {
//!     Command::Info(config) => println!("{}", config.reader.path.display()),
//!     _ => {}
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `DM3_MAX_DEPTH` - Maximum tag tree nesting depth (default: 64)
//! - `DM3_FORMAT` - Output format of `dm3 info`, `text` or `json` (default: text)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::format::dm3::{ParseOptions, DEFAULT_MAX_DEPTH};

// =============================================================================
// Default Values
// =============================================================================

/// Largest accepted `--max-depth`.
pub const MAX_DEPTH_LIMIT: usize = 4096;

// =============================================================================
// CLI Arguments
// =============================================================================

/// dm3 - Inspect GATAN DigitalMicrograph DM3 files.
#[derive(Parser, Debug, Clone)]
#[command(name = "dm3")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print acquisition metadata, image shape, calibration and contrast limits.
    Info(InfoConfig),

    /// Dump every tag as `path = value`, in file order.
    Tags(TagsConfig),

    /// Parse the file and decode its image; the exit status reports success.
    Check(CheckConfig),
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ReaderArgs {
    /// Path of the DM3 file.
    pub path: PathBuf,

    /// Maximum nesting depth of the tag tree.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, env = "DM3_MAX_DEPTH")]
    pub max_depth: usize,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ReaderArgs {
    /// Validate the arguments and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("A DM3 file path is required".to_string());
        }

        if self.max_depth == 0 || self.max_depth > MAX_DEPTH_LIMIT {
            return Err(format!(
                "max_depth must be between 1 and {}. Set --max-depth or DM3_MAX_DEPTH",
                MAX_DEPTH_LIMIT
            ));
        }

        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::default().with_max_depth(self.max_depth)
    }
}

/// Output format of the `info` subcommand.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human readable `key: value` lines
    #[default]
    Text,
    /// One pretty-printed JSON object
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    #[command(flatten)]
    pub reader: ReaderArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "DM3_FORMAT")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct TagsConfig {
    #[command(flatten)]
    pub reader: ReaderArgs,

    /// Only print tags whose path starts with this prefix.
    #[arg(long)]
    pub prefix: Option<String>,
}

impl TagsConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.reader.validate()?;

        if let Some(ref prefix) = self.prefix {
            if prefix.trim().is_empty() {
                return Err("prefix must not be blank".to_string());
            }
        }

        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub reader: ReaderArgs,

    /// Also decode the embedded thumbnail.
    #[arg(long, default_value_t = false)]
    pub thumbnail: bool,
}

// =============================================================================
// Tests
// =============================================================================
