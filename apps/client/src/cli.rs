use crate::backend::BackendKind;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "codesearch", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase verbosity. Can be used multiple times (e.g., -v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Backend to query, overrides the config file
    #[arg(long, value_enum, global = true)]
    pub backend: Option<BackendKind>,

    /// Use this config file instead of the platform default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Query plus the optional narrowing every search accepts
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Free text query
    pub query: Option<String>,

    /// Take the query from the word at FILE:OFFSET instead
    #[arg(long, value_name = "FILE:OFFSET", conflicts_with = "query")]
    pub at: Option<String>,

    /// Restrict to one facet id
    #[arg(long)]
    pub facet: Option<String>,

    /// Restrict to a file extension ("all" for none)
    #[arg(long)]
    pub file_type: Option<String>,

    #[arg(long)]
    pub file_name: Option<String>,

    #[arg(long)]
    pub file_path: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the facets a query hits
    Facets(QueryArgs),
    /// Load result pages of one facet and print them
    Results {
        #[command(flatten)]
        query: QueryArgs,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: usize,

        /// Only show results with these extensions
        #[arg(long = "filter", value_name = "EXT")]
        filters: Vec<String>,
    },
    /// Find files by name, `Name in facet` narrows to a facet
    Find {
        pattern: String,

        /// Do not restrict to the default source extension
        #[arg(long)]
        everywhere: bool,
    },
    /// Interactive session
    Shell,
}
