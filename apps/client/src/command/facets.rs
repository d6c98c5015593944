use super::{Command, Context, build_request};
use crate::cli::QueryArgs;
use crate::error::{Result, error};
use crate::render;
use search_core::FacetsView;
use tokio::sync::mpsc;
use tracing::info;

pub struct FacetsCommand {
    context: Context,
    args: QueryArgs,
}

impl FacetsCommand {
    pub fn new(context: Context, args: QueryArgs) -> Self {
        Self { context, args }
    }
}

#[async_trait::async_trait]
impl Command for FacetsCommand {
    async fn execute(&self) -> Result<()> {
        let request = build_request(self.context.searcher.as_ref(), &self.args)?;
        let query = request.query().unwrap_or_default().to_string();
        println!("{}", render::title(&query));

        let (tx_view, _rx_view) = mpsc::unbounded_channel();
        let mut view = FacetsView::new(tx_view);
        view.mark_loading();

        let outcome = self.context.searcher.facets(&request).await;
        let failure = outcome.as_ref().err().cloned();
        view.update(outcome, &query);
        info!(request = %request, "facets loaded");
        self.context.history.add(request);

        print!("{}", render::facets(&view));
        match failure {
            Some(e) => Err(error!(e).wrap_err("facet search failed")),
            None => Ok(()),
        }
    }
}
