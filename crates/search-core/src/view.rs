//! State behind the facets pane and the results pane.
//!
//! Both views are owned by a single coordination loop. Workers never touch them
//! directly: fetched data comes back over a channel and is applied here, and every
//! change is announced as a [`ViewEvent`] for whoever renders.

use crate::error::{Result, SearchError};
use crate::filter::FilteredTree;
use crate::models::{SearchFacet, SearchResult};
use crate::paging::{FacetPager, PageApplied, PageOutcome, PageTicket};
use crate::request::SearchRequest;
use crate::tree::{NodeId, NodeValue, ResultTree, TreeModel};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Pane {
    Facets,
    Results,
}

#[derive(Debug)]
pub enum ViewEvent {
    /// The pane's visible structure changed and must be redrawn
    StructureChanged(Pane),
    FetchFailed { pane: Pane, error: SearchError },
}

fn emit(events: &UnboundedSender<ViewEvent>, event: ViewEvent) {
    // Nobody listening is fine, the state is still current.
    let _ = events.send(event);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetsStatus {
    Idle,
    Loading,
    Ready,
    NoResults { query: String },
    Error,
}

impl fmt::Display for FacetsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetsStatus::Idle => f.write_str("Type a query to search"),
            FacetsStatus::Loading => f.write_str("Loading facets..."),
            FacetsStatus::Ready => f.write_str("Facets"),
            FacetsStatus::NoResults { query } => write!(f, "No results found for '{query}'"),
            FacetsStatus::Error => f.write_str("Error while fetching facets"),
        }
    }
}

pub struct FacetsView {
    tree: ResultTree,
    status: FacetsStatus,
    events: UnboundedSender<ViewEvent>,
}

impl FacetsView {
    pub fn new(events: UnboundedSender<ViewEvent>) -> Self {
        let status = FacetsStatus::Idle;
        Self {
            tree: ResultTree::new(status.to_string()),
            status,
            events,
        }
    }

    fn set_status(&mut self, status: FacetsStatus) {
        self.tree.set_label(status.to_string());
        self.status = status;
    }

    /// A facets request went out; drop the previous list.
    pub fn mark_loading(&mut self) {
        self.tree.reset(FacetsStatus::Loading.to_string());
        self.status = FacetsStatus::Loading;
        emit(&self.events, ViewEvent::StructureChanged(Pane::Facets));
    }

    pub fn update(&mut self, outcome: Result<Vec<SearchFacet>>, query: &str) {
        self.tree.reset(FacetsStatus::Loading.to_string());
        match outcome {
            Ok(facets) if facets.is_empty() => {
                info!(query, "no facets found");
                self.set_status(FacetsStatus::NoResults {
                    query: query.to_string(),
                });
            }
            Ok(facets) => {
                for facet in facets {
                    self.tree.push_facet(facet);
                }
                self.set_status(FacetsStatus::Ready);
            }
            Err(error) => {
                self.set_status(FacetsStatus::Error);
                emit(
                    &self.events,
                    ViewEvent::FetchFailed {
                        pane: Pane::Facets,
                        error,
                    },
                );
            }
        }
        emit(&self.events, ViewEvent::StructureChanged(Pane::Facets));
    }

    pub fn status(&self) -> &FacetsStatus {
        &self.status
    }

    pub fn tree(&self) -> &ResultTree {
        &self.tree
    }

    pub fn facets(&self) -> impl Iterator<Item = &SearchFacet> {
        self.tree.facets()
    }

    pub fn facet(&self, index: usize) -> Option<&SearchFacet> {
        self.facets().nth(index)
    }
}

/// What activating a results node asks the caller to do
#[derive(Debug, PartialEq, Eq)]
pub enum Activation {
    /// Fetch this page and hand it back to [`ResultsView::apply_page`]
    LoadMore(PageTicket),
    /// Backfill and open the result
    Open(NodeId),
    Nothing,
}

pub struct ResultsView {
    tree: FilteredTree<ResultTree>,
    pager: Option<FacetPager>,
    /// Bumped on every facet selection; pages from earlier selections are dropped
    generation: u64,
    selected: Option<NodeId>,
    page_size: usize,
    events: UnboundedSender<ViewEvent>,
}

impl ResultsView {
    pub fn new(page_size: usize, events: UnboundedSender<ViewEvent>) -> Self {
        Self {
            tree: FilteredTree::new(ResultTree::new("Results")),
            pager: None,
            generation: 0,
            selected: None,
            page_size,
            events,
        }
    }

    pub fn tree(&self) -> &FilteredTree<ResultTree> {
        &self.tree
    }

    pub fn facet(&self) -> Option<&SearchFacet> {
        self.pager.as_ref().map(FacetPager::facet)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.pager = None;
        self.selected = None;
        self.tree.model_mut().reset("Results");
        emit(&self.events, ViewEvent::StructureChanged(Pane::Results));
    }

    /// Switch to `facet` and return the ticket for its first page.
    ///
    /// `base` supplies the dialect and server knobs; the query comes from the facet.
    pub fn select_facet(&mut self, facet: SearchFacet, base: SearchRequest) -> Option<PageTicket> {
        self.clear();
        self.tree.model_mut().set_label(format!("Loading results for {}...", facet.name()));

        let mut template = base;
        template.set_query(facet.query());
        debug!(facet = facet.id(), generation = self.generation, "facet selected");

        let mut pager = FacetPager::new(facet, template, self.page_size, self.generation);
        let ticket = pager.next_page();
        if ticket.is_none() {
            // Nothing to fetch, so no page will ever replace the loading label
            let label = pager.facet().to_string();
            self.tree.model_mut().set_label(label);
            emit(&self.events, ViewEvent::StructureChanged(Pane::Results));
        }
        self.pager = Some(pager);
        ticket
    }

    pub fn load_more(&mut self) -> Option<PageTicket> {
        self.pager.as_mut()?.next_page()
    }

    pub fn apply_page(&mut self, ticket: &PageTicket, outcome: PageOutcome) -> PageApplied {
        let Some(pager) = self.pager.as_mut() else {
            return PageApplied::Stale;
        };

        let applied = pager.apply(self.tree.model_mut(), ticket, outcome);
        match &applied {
            PageApplied::Stale => return PageApplied::Stale,
            PageApplied::Appended { .. } => {
                let label = pager.facet().to_string();
                self.tree.model_mut().set_label(label);
            }
            PageApplied::Failed(error) => {
                let label = format!("{} (failed to load)", pager.facet().name());
                self.tree.model_mut().set_label(label);
                emit(
                    &self.events,
                    ViewEvent::FetchFailed {
                        pane: Pane::Results,
                        error: error.clone(),
                    },
                );
            }
        }
        emit(&self.events, ViewEvent::StructureChanged(Pane::Results));
        applied
    }

    pub fn add_filter(&mut self, extension: &str) -> bool {
        self.filters_changed(|tree| tree.add_filter(extension))
    }

    pub fn remove_filter(&mut self, extension: &str) -> bool {
        self.filters_changed(|tree| tree.remove_filter(extension))
    }

    fn filters_changed(&mut self, change: impl FnOnce(&mut FilteredTree<ResultTree>) -> bool) -> bool {
        let changed = change(&mut self.tree);
        if changed {
            // The selection may have been filtered out
            let root = self.tree.root();
            let hidden = self
                .selected
                .is_some_and(|s| self.tree.index_of_child(root, s).is_none());
            if hidden {
                self.selected = None;
            }
            emit(&self.events, ViewEvent::StructureChanged(Pane::Results));
        }
        changed
    }

    /// Visible results in display order, sentinel excluded
    pub fn visible_results(&self) -> Vec<(NodeId, &SearchResult)> {
        let root = self.tree.root();
        (0..self.tree.child_count(root))
            .filter_map(|i| self.tree.child(root, i))
            .filter_map(|id| self.result(id).map(|r| (id, r)))
            .collect()
    }

    pub fn result(&self, node: NodeId) -> Option<&SearchResult> {
        self.tree.value(node).and_then(NodeValue::as_result)
    }

    /// Write back a result after backfilling a copy of it.
    pub fn store_result(&mut self, node: NodeId, result: SearchResult) -> bool {
        match self.tree.model_mut().result_mut(node) {
            Some(slot) => {
                *slot = result;
                true
            }
            None => false,
        }
    }

    fn is_result(&self, node: NodeId) -> bool {
        self.result(node).is_some()
    }

    pub fn activate(&mut self, node: NodeId) -> Activation {
        if self.tree.model().is_load_more(node) {
            return match self.load_more() {
                Some(ticket) => {
                    self.tree.model_mut().set_label("Loading more results...");
                    Activation::LoadMore(ticket)
                }
                None => Activation::Nothing,
            };
        }
        if self.is_result(node) {
            self.selected = Some(node);
            return Activation::Open(node);
        }
        Activation::Nothing
    }

    /// Select the result after the current one, or the first one when nothing is
    /// selected. Stops at the last result.
    pub fn select_next(&mut self) -> Option<NodeId> {
        let root = self.tree.root();
        let next = match self.selected.and_then(|s| self.tree.index_of_child(root, s)) {
            Some(index) => self.tree.child(root, index + 1)?,
            None => self.tree.child(root, 0)?,
        };
        if !self.is_result(next) {
            return None;
        }
        self.selected = Some(next);
        Some(next)
    }

    /// Select the result before the current one, or the last one when nothing is
    /// selected. Stops at the first result.
    pub fn select_prev(&mut self) -> Option<NodeId> {
        let root = self.tree.root();
        let prev = match self.selected.and_then(|s| self.tree.index_of_child(root, s)) {
            Some(0) => return None,
            Some(index) => self.tree.child(root, index - 1)?,
            None => {
                let count = self.tree.child_count(root);
                (0..count)
                    .rev()
                    .filter_map(|i| self.tree.child(root, i))
                    .find(|id| self.is_result(*id))?
            }
        };
        if !self.is_result(prev) {
            return None;
        }
        self.selected = Some(prev);
        Some(prev)
    }
}
