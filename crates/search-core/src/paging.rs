//! Incremental "load more" paging for one facet.
//!
//! Windows are true offsets: the next page starts where the previous one stopped and
//! never asks for more than the facet has left.

use crate::error::{Result, SearchError};
use crate::models::{SearchFacet, SearchResult};
use crate::request::SearchRequest;
use crate::tree::ResultTree;
use tracing::{debug, warn};

/// What a fetched page came back with
pub type PageOutcome = Result<Vec<SearchResult>>;

/// Issued for every page request; the outcome must be applied with the same ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    /// Facet selection this page belongs to
    pub generation: u64,
    pub facet_id: String,
    pub request: SearchRequest,
}

#[derive(Debug)]
pub enum PageApplied {
    Appended { added: usize },
    /// The ticket belongs to an earlier facet selection; nothing was touched
    Stale,
    Failed(SearchError),
}

#[derive(Debug, Clone)]
pub struct FacetPager {
    facet: SearchFacet,
    template: SearchRequest,
    page_size: usize,
    generation: u64,
    /// Backend offset consumed so far
    loaded: usize,
    in_flight: bool,
    exhausted: bool,
}

impl FacetPager {
    /// `template` carries the query and filters; the pager fills in facet and window.
    pub fn new(facet: SearchFacet, template: SearchRequest, page_size: usize, generation: u64) -> Self {
        Self {
            facet,
            template,
            page_size: page_size.max(1),
            generation,
            loaded: 0,
            in_flight: false,
            exhausted: false,
        }
    }

    pub fn facet(&self) -> &SearchFacet {
        &self.facet
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted && self.loaded < self.facet.match_count()
    }

    /// Request the next window. `None` while a page is pending or when nothing is left.
    pub fn next_page(&mut self) -> Option<PageTicket> {
        if self.in_flight || !self.has_more() {
            return None;
        }

        let remaining = self.facet.match_count() - self.loaded;
        let mut request = self.template.clone();
        request
            .set_facet(self.facet.id())
            .set_start(self.loaded)
            .set_num_to_return(self.page_size.min(remaining));

        self.in_flight = true;
        debug!(
            facet = self.facet.id(),
            start = self.loaded,
            num = request.num_to_return(),
            "requesting page"
        );
        Some(PageTicket {
            generation: self.generation,
            facet_id: self.facet.id().to_string(),
            request,
        })
    }

    /// Merge a page into `tree` and put the sentinel back if more is available.
    pub fn apply(&mut self, tree: &mut ResultTree, ticket: &PageTicket, outcome: PageOutcome) -> PageApplied {
        if ticket.generation != self.generation || ticket.facet_id != self.facet.id() {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale page"
            );
            return PageApplied::Stale;
        }

        self.in_flight = false;
        tree.set_load_more(false);

        let applied = match outcome {
            Ok(results) => {
                let received = results.len();
                let mut added = 0;
                for result in results {
                    if tree.contains_result(result.product_name(), result.file_path()) {
                        continue;
                    }
                    tree.push_result(result);
                    added += 1;
                }
                self.loaded += received;

                if received == 0 && self.loaded < self.facet.match_count() {
                    warn!(
                        facet = self.facet.id(),
                        loaded = self.loaded,
                        expected = self.facet.match_count(),
                        "backend ran out of results early"
                    );
                    self.exhausted = true;
                }
                PageApplied::Appended { added }
            }
            Err(e) => {
                warn!(facet = self.facet.id(), error = %e, "page fetch failed");
                PageApplied::Failed(e)
            }
        };

        tree.set_load_more(self.has_more());
        applied
    }
}
