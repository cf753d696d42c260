use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ravcat")]
#[command(about = "Find where to report abuse to a service, or a false positive to a security vendor")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./config/ravcat.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose logging (use -v for load progress, -vv for every attempt)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show report contacts for a company or service
    Company {
        /// Company name, or any part of it
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Show false-positive contacts for a security vendor
    Vendor {
        /// Vendor name, or any part of it
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// List every entry of a directory
    List {
        /// List security vendors instead of companies
        #[arg(long)]
        vendors: bool,
    },

    /// Create default configuration file at ./config/ravcat.toml
    Init,
}

impl Commands {
    /// Multi-word names arrive as separate arguments.
    pub fn joined(name: &[String]) -> String {
        name.join(" ")
    }
}
