mod backend;
mod cli;
mod command;
mod config;
mod error;
mod render;

use error::WrapErr;

use clap::CommandFactory;
use clap::Parser;
use search_core::{SearchExecutor, SearchHistory};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> error::Result<()> {
    color_eyre::install()?;
    let command_line = cli::Cli::parse();
    init_tracing(command_line.verbose);

    let Some(command) = command_line.command else {
        cli::Cli::command().print_help()?;
        return Ok(());
    };

    let mut cfg = config::Config::load(command_line.config.as_deref())
        .context("Load configuration error")?;
    if let Some(kind) = command_line.backend {
        cfg.backend.kind = kind;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cfg.search.worker_threads.max(1))
        .thread_name("search-worker")
        .enable_all()
        .build()
        .context("Start runtime error")?;

    let searcher = backend::build_searcher(&cfg.backend).context("Create backend error")?;
    let context = command::Context {
        executor: SearchExecutor::new(runtime.handle().clone()),
        history: Arc::new(SearchHistory::new()),
        searcher,
        config: cfg,
    };

    let cmd: Box<dyn command::Command> = match command {
        cli::Commands::Facets(args) => Box::new(command::FacetsCommand::new(context, args)),
        cli::Commands::Results {
            query,
            pages,
            filters,
        } => Box::new(command::ResultsCommand::new(context, query, pages, filters)),
        cli::Commands::Find {
            pattern,
            everywhere,
        } => Box::new(command::FindCommand::new(context, pattern, everywhere)),
        cli::Commands::Shell => Box::new(command::ShellCommand::new(context)),
    };
    runtime.block_on(cmd.execute())
}
