use crate::config::{BackendConfig, ConfigError};
use search_core::{
    DummySearcher, NodeId, PageOutcome, PageTicket, SearchFacet, SearchRequest, SearchResult,
    Searcher,
};
use searchcode::SearchCodeClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BackendKind {
    #[value(name = "searchcode")]
    #[serde(rename = "searchcode")]
    #[strum(serialize = "searchcode")]
    SearchCode,
    /// Canned answers, no network
    Dummy,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot create the HTTP client")]
    Client(#[from] search_core::SearchError),
}

pub fn build_searcher(config: &BackendConfig) -> Result<Arc<dyn Searcher>, BackendError> {
    info!(backend = %config.kind, "using backend");
    let searcher: Arc<dyn Searcher> = match config.kind {
        BackendKind::SearchCode => Arc::new(SearchCodeClient::new(
            config.base_url()?,
            config.http_timeout(),
        )?),
        BackendKind::Dummy => Arc::new(DummySearcher),
    };
    Ok(searcher)
}

/// Work finished on a runtime worker, drained by the shell loop
#[derive(Debug)]
pub enum BackendEvent {
    Facets {
        request: SearchRequest,
        outcome: search_core::Result<Vec<SearchFacet>>,
    },
    Page {
        ticket: PageTicket,
        outcome: PageOutcome,
    },
    Backfilled {
        generation: u64,
        node: NodeId,
        result: SearchResult,
    },
}

/// Runs searcher calls on the runtime and reports back over a channel.
#[derive(Clone)]
pub struct Backend {
    searcher: Arc<dyn Searcher>,
    runtime: Handle,
    tx_event: UnboundedSender<BackendEvent>,
}

impl Backend {
    pub fn new(searcher: Arc<dyn Searcher>, runtime: Handle, tx_event: UnboundedSender<BackendEvent>) -> Self {
        Self {
            searcher,
            runtime,
            tx_event,
        }
    }

    pub fn searcher(&self) -> &Arc<dyn Searcher> {
        &self.searcher
    }

    pub fn request_facets(&self, request: SearchRequest) {
        let searcher = self.searcher.clone();
        let tx_event = self.tx_event.clone();
        self.runtime.spawn(async move {
            let outcome = searcher.facets(&request).await;
            let _ = tx_event.send(BackendEvent::Facets { request, outcome });
        });
    }

    pub fn request_page(&self, ticket: PageTicket) {
        let searcher = self.searcher.clone();
        let tx_event = self.tx_event.clone();
        self.runtime.spawn(async move {
            let outcome = searcher.results(&ticket.request).await;
            let _ = tx_event.send(BackendEvent::Page { ticket, outcome });
        });
    }

    pub fn request_backfill(&self, generation: u64, node: NodeId, mut result: SearchResult, facet: SearchFacet) {
        let searcher = self.searcher.clone();
        let tx_event = self.tx_event.clone();
        self.runtime.spawn(async move {
            search_core::validate_result(searcher.as_ref(), &mut result, &facet).await;
            let _ = tx_event.send(BackendEvent::Backfilled {
                generation,
                node,
                result,
            });
        });
    }
}
