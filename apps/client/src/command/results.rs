use super::{Command, Context, build_request};
use crate::cli::QueryArgs;
use crate::error::{OptionExt, Result, WrapErr};
use crate::render;
use search_core::{PageApplied, ResultsView, SearchFacet};
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub struct ResultsCommand {
    context: Context,
    args: QueryArgs,
    pages: usize,
    filters: Vec<String>,
}

impl ResultsCommand {
    pub fn new(context: Context, args: QueryArgs, pages: usize, filters: Vec<String>) -> Self {
        Self {
            context,
            args,
            pages,
            filters,
        }
    }

    /// The facet asked for on the command line, or the biggest one.
    async fn pick_facet(&self) -> Result<SearchFacet> {
        let mut request = build_request(self.context.searcher.as_ref(), &self.args)?;
        let wanted = request.facet().map(str::to_string);
        if wanted.is_some() {
            // Ask across all facets so the wanted one shows up with its count
            let mut unscoped = self.context.searcher.new_request();
            unscoped
                .set_query(request.query())
                .set_file_type(request.file_type())
                .set_file_name(request.file_name())
                .set_file_path(request.file_path());
            request = unscoped;
        }

        let facets = self
            .context
            .searcher
            .facets(&request)
            .await
            .wrap_err("facet search failed")?;
        self.context.history.add(request);

        let facet = match wanted {
            Some(id) => facets.into_iter().find(|f| f.id() == id || f.name() == id),
            None => facets.into_iter().max_by_key(SearchFacet::match_count),
        };
        facet.ok_or_eyre("no matching facet")
    }
}

#[async_trait::async_trait]
impl Command for ResultsCommand {
    async fn execute(&self) -> Result<()> {
        let facet = self.pick_facet().await?;
        debug!(facet = facet.id(), count = facet.match_count(), "loading results");

        let (tx_view, _rx_view) = mpsc::unbounded_channel();
        let mut view = ResultsView::new(self.context.config.search.page_size(), tx_view);
        for filter in &self.filters {
            view.add_filter(filter);
        }

        let mut ticket = view.select_facet(facet, self.context.new_request());
        for _ in 0..self.pages.max(1) {
            let Some(current) = ticket.take() else {
                break;
            };
            let outcome = self.context.searcher.results(&current.request).await;
            if let PageApplied::Failed(e) = view.apply_page(&current, outcome) {
                warn!(error = %e, "stopping after failed page");
                break;
            }
            ticket = view.load_more();
        }

        print!("{}", render::results(&view));
        Ok(())
    }
}
