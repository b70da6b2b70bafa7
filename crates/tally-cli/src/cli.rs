use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tally", about = "Tally: a git-backed versioned object store", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Repository root (overrides the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub author_name: Option<String>,

    #[arg(long, global = true)]
    pub author_email: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a repository
    Init,
    /// Report whether the working tree differs from history
    Status,
    /// Show history entries
    Log(LogArgs),
    /// Save a JSON document (an array saves a batch)
    Put(PutArgs),
    /// Print a stored document
    Get(GetArgs),
    /// List documents of a type
    List(ListArgs),
    /// Store and retrieve binary files
    File(FileArgs),
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct PutArgs {
    pub type_name: String,
    pub json_file: PathBuf,
}

#[derive(Args)]
pub struct GetArgs {
    pub type_name: String,
    pub id: String,
}

#[derive(Args)]
pub struct ListArgs {
    pub type_name: String,
    /// Equality filter, `FIELD=VALUE`
    #[arg(long = "where", value_name = "FIELD=VALUE")]
    pub filter: Option<String>,
}

#[derive(Args)]
pub struct FileArgs {
    #[command(subcommand)]
    pub action: FileAction,
}

#[derive(Subcommand)]
pub enum FileAction {
    /// Store one or more files
    Put {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Stored name (single path only)
        #[arg(long)]
        name: Option<String>,
    },
    /// Write a stored file to stdout or `-o`
    Get {
        name: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List stored file names
    List,
}
