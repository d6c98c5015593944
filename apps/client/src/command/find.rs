use super::{Command, Context};
use crate::error::{Result, WrapErr, error};
use search_core::{DebouncedDispatcher, DispatchOutcome};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct FindCommand {
    context: Context,
    pattern: String,
    everywhere: bool,
}

impl FindCommand {
    pub fn new(context: Context, pattern: String, everywhere: bool) -> Self {
        Self {
            context,
            pattern,
            everywhere,
        }
    }
}

#[async_trait::async_trait]
impl Command for FindCommand {
    async fn execute(&self) -> Result<()> {
        let dispatcher = DebouncedDispatcher::new(
            self.context.searcher.clone(),
            self.context.executor.clone(),
            &self.context.config.search,
        );
        let cancel = CancellationToken::new();

        // The lookup waits on a plain thread, the way a host's background task would.
        let (tx_outcome, rx_outcome) = oneshot::channel();
        let worker_cancel = cancel.clone();
        let pattern = self.pattern.clone();
        let everywhere = self.everywhere;
        std::thread::spawn(move || {
            let outcome =
                dispatcher.filter_elements_blocking(&pattern, everywhere, &worker_cancel, |result| {
                    println!("{}", result.file_path());
                    true
                });
            let _ = tx_outcome.send(outcome);
        });

        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
        let outcome = rx_outcome.await.wrap_err("finder thread stopped")?;
        interrupt.abort();

        match outcome {
            DispatchOutcome::Delivered { count } => {
                info!(pattern = %self.pattern, count, "find finished");
                eprintln!("{count} file(s)");
                Ok(())
            }
            DispatchOutcome::Cancelled => {
                eprintln!("cancelled");
                Ok(())
            }
            DispatchOutcome::Failed(e) => Err(error!(e).wrap_err("find failed")),
        }
    }
}
