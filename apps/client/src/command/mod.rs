pub mod facets;
pub mod find;
pub mod results;
pub mod shell;

use crate::cli::QueryArgs;
use crate::config::Config;
use crate::error::{OptionExt, Result, WrapErr, error};
use search_core::{SearchExecutor, SearchHistory, SearchRequest, Searcher, query_text};
use std::sync::Arc;

pub use facets::FacetsCommand;
pub use find::FindCommand;
pub use results::ResultsCommand;
pub use shell::ShellCommand;

#[async_trait::async_trait]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Everything a command needs from the process
#[derive(Clone)]
pub struct Context {
    pub config: Config,
    pub searcher: Arc<dyn Searcher>,
    pub executor: SearchExecutor,
    pub history: Arc<SearchHistory>,
}

impl Context {
    /// A blank request for the backend carrying the configured server knobs.
    pub fn new_request(&self) -> SearchRequest {
        let mut request = self.searcher.new_request();
        request
            .set_num_to_score(self.config.search.num_to_score)
            .set_request_timeout(self.config.search.request_timeout_ms);
        request
    }
}

/// Pick the word at `FILE:OFFSET` as the query.
fn query_at(location: &str) -> Result<String> {
    let (file, offset) = location
        .rsplit_once(':')
        .ok_or_eyre("expected FILE:OFFSET")?;
    let offset: usize = offset
        .parse()
        .wrap_err_with(|| format!("invalid offset {offset:?}"))?;
    let text = std::fs::read_to_string(file).wrap_err_with(|| format!("cannot read {file}"))?;

    query_text::search_string(None, &text, offset)
        .ok_or_else(|| error!("no word of at least {} characters at {location}", query_text::MIN_QUERY_LENGTH))
}

/// Turn command line arguments into a request for `searcher`.
pub fn build_request(searcher: &dyn Searcher, args: &QueryArgs) -> Result<SearchRequest> {
    let query = match (&args.query, &args.at) {
        (_, Some(location)) => Some(query_at(location)?),
        (query, None) => query.clone(),
    };

    let mut request = searcher.new_request();
    request
        .set_query(query.as_deref())
        .set_facet(args.facet.as_deref())
        .set_file_type(args.file_type.as_deref())
        .set_file_name(args.file_name.as_deref())
        .set_file_path(args.file_path.as_deref());

    if request.query().is_none() && request.file_name().is_none() {
        return Err(error!("nothing to search for, give a query or --at FILE:OFFSET"));
    }
    Ok(request)
}
