//! Extension filter layered over a [`TreeModel`].
//!
//! The backing tree is never touched: visibility is derived again on every query, so
//! adding results or changing filters needs no bookkeeping beyond a structure-changed
//! notification from the caller.

use crate::tree::{NodeId, NodeValue, TreeModel};
use indexmap::IndexSet;

#[derive(Debug, Clone)]
pub struct FilteredTree<M> {
    model: M,
    /// Lowercased file extensions
    filters: IndexSet<String>,
}

impl<M: TreeModel> FilteredTree<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            filters: IndexSet::new(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Returns whether the filter set changed.
    pub fn add_filter(&mut self, extension: &str) -> bool {
        self.filters.insert(extension.to_lowercase())
    }

    /// Returns whether the filter set changed.
    pub fn remove_filter(&mut self, extension: &str) -> bool {
        self.filters.shift_remove(&extension.to_lowercase())
    }

    pub fn clear_filters(&mut self) -> bool {
        let changed = !self.filters.is_empty();
        self.filters.clear();
        changed
    }

    pub fn filters(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(String::as_str)
    }

    fn matches(&self, node: NodeId) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        match self.model.value(node) {
            Some(NodeValue::Result(result)) => self
                .filters
                .contains(&result.file_extension().to_lowercase()),
            _ => true,
        }
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.matches(node)
            || (0..self.model.child_count(node))
                .filter_map(|i| self.model.child(node, i))
                .any(|child| self.is_visible(child))
    }

    fn visible_children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.model.child_count(parent))
            .filter_map(move |i| self.model.child(parent, i))
            .filter(move |child| self.is_visible(*child))
    }

    /// Position of `child` among the visible children of `parent`
    pub fn index_of_child(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.visible_children(parent).position(|c| c == child)
    }
}

impl<M: TreeModel> TreeModel for FilteredTree<M> {
    fn root(&self) -> NodeId {
        self.model.root()
    }

    fn child_count(&self, parent: NodeId) -> usize {
        self.visible_children(parent).count()
    }

    fn child(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.visible_children(parent).nth(index)
    }

    fn value(&self, node: NodeId) -> Option<&NodeValue> {
        self.model.value(node)
    }
}
