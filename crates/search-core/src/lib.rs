// search-core/src/lib.rs
//! Core of the code search client.
//!
//! Provides:
//! - the request model and the asynchronous [`Searcher`] contract backends implement
//! - delayed, cancellable dispatch for search-as-you-type
//! - a history of issued searches
//! - incremental "load more" paging per facet
//! - a result tree with an extension filter layered on top

pub mod backfill;
pub mod config;
pub mod dispatcher;
pub mod dummy;
pub mod error;
pub mod executor;
pub mod filter;
pub mod history;
pub mod models;
pub mod paging;
pub mod query_text;
pub mod request;
pub mod searcher;
pub mod tree;
pub mod view;

// Re-export the core types
pub use backfill::validate_result;
pub use config::SearchConfig;
pub use dispatcher::{DebouncedDispatcher, DispatchOutcome};
pub use dummy::DummySearcher;
pub use error::{Result, SearchError};
pub use executor::{DelayedHandle, SearchExecutor, TaskState, WaitOutcome};
pub use filter::FilteredTree;
pub use history::SearchHistory;
pub use models::{HighlightEntry, SearchFacet, SearchResult};
pub use paging::{FacetPager, PageApplied, PageOutcome, PageTicket};
pub use request::{Dialect, SearchContext, SearchRequest};
pub use searcher::Searcher;
pub use tree::{NodeId, NodeValue, ResultTree, TreeModel};
pub use view::{Activation, FacetsStatus, FacetsView, Pane, ResultsView, ViewEvent};
