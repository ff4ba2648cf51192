use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::models::MasterKind;
use crate::storage::FileKind;

#[derive(Parser)]
#[command(name = "taxi-weather-etl")]
#[command(about = "Chicago taxi trip and weather ETL")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Settings file [default: taxi-etl.toml if present]"
    )]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Hide progress output")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one day of trips and weather into the incoming prefixes
    Extract {
        #[arg(
            short,
            long,
            help = "Day to extract (YYYY-MM-DD) [default: today minus the configured lag]"
        )]
        date: Option<NaiveDate>,
    },

    /// Transform every pending raw file
    Transform {
        #[arg(long, value_enum, help = "Only process one file type")]
        only: Option<FileTypeArg>,
    },

    /// Show pending raw files and master table sizes
    Status,

    /// Print a master table
    Master {
        #[arg(short, long, value_enum)]
        kind: MasterKindArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileTypeArg {
    Taxi,
    Weather,
}

impl From<FileTypeArg> for FileKind {
    fn from(arg: FileTypeArg) -> Self {
        match arg {
            FileTypeArg::Taxi => FileKind::Taxi,
            FileTypeArg::Weather => FileKind::Weather,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MasterKindArg {
    PaymentType,
    Company,
}

impl From<MasterKindArg> for MasterKind {
    fn from(arg: MasterKindArg) -> Self {
        match arg {
            MasterKindArg::PaymentType => MasterKind::PaymentType,
            MasterKindArg::Company => MasterKind::Company,
        }
    }
}
