//! Rooted tree holding what the views display.
//!
//! [`ResultTree`] is an arena: nodes are addressed by [`NodeId`] and never move. The
//! root's children are results (or facets) followed by at most one "load more"
//! sentinel, which is always the last child.

use crate::models::{SearchFacet, SearchResult};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    Label(String),
    Facet(SearchFacet),
    Result(SearchResult),
    /// Placeholder the user activates to fetch the next page
    LoadMore,
}

impl NodeValue {
    pub fn as_result(&self) -> Option<&SearchResult> {
        match self {
            NodeValue::Result(result) => Some(result),
            _ => None,
        }
    }

    pub fn as_facet(&self) -> Option<&SearchFacet> {
        match self {
            NodeValue::Facet(facet) => Some(facet),
            _ => None,
        }
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Label(text) => f.write_str(text),
            NodeValue::Facet(facet) => facet.fmt(f),
            NodeValue::Result(result) => result.fmt(f),
            NodeValue::LoadMore => f.write_str("Load more results..."),
        }
    }
}

/// Read access the filtered view needs from a tree.
pub trait TreeModel {
    fn root(&self) -> NodeId;
    fn child_count(&self, parent: NodeId) -> usize;
    fn child(&self, parent: NodeId, index: usize) -> Option<NodeId>;
    fn value(&self, node: NodeId) -> Option<&NodeValue>;

    fn is_leaf(&self, node: NodeId) -> bool {
        self.child_count(node) == 0
    }
}

#[derive(Debug, Clone)]
struct Node {
    value: NodeValue,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ResultTree {
    nodes: Vec<Node>,
    /// Allocated on first use and reused afterwards
    sentinel: Option<NodeId>,
}

const ROOT: NodeId = NodeId(0);

impl ResultTree {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node {
                value: NodeValue::Label(label.into()),
                children: Vec::new(),
            }],
            sentinel: None,
        }
    }

    /// Drop every node and start over with a fresh root label.
    pub fn reset(&mut self, label: impl Into<String>) {
        *self = Self::new(label);
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.nodes[ROOT.0].value = NodeValue::Label(label.into());
    }

    pub fn label(&self) -> String {
        self.nodes[ROOT.0].value.to_string()
    }

    fn alloc(&mut self, value: NodeValue) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            children: Vec::new(),
        });
        id
    }

    /// Append a child, keeping the root's sentinel last.
    fn insert_child(&mut self, parent: NodeId, value: NodeValue) -> NodeId {
        let id = self.alloc(value);
        let children = &mut self.nodes[parent.0].children;
        match self.sentinel {
            Some(sentinel) if parent == ROOT && children.last() == Some(&sentinel) => {
                children.insert(children.len() - 1, id);
            }
            _ => children.push(id),
        }
        id
    }

    /// Add a child under `parent`. `None` if `parent` does not exist or `value` is
    /// the sentinel, which only [`Self::set_load_more`] places.
    pub fn push(&mut self, parent: NodeId, value: NodeValue) -> Option<NodeId> {
        if matches!(value, NodeValue::LoadMore) || parent.0 >= self.nodes.len() {
            return None;
        }
        Some(self.insert_child(parent, value))
    }

    pub fn push_result(&mut self, result: SearchResult) -> NodeId {
        self.insert_child(ROOT, NodeValue::Result(result))
    }

    pub fn push_facet(&mut self, facet: SearchFacet) -> NodeId {
        self.insert_child(ROOT, NodeValue::Facet(facet))
    }

    pub fn has_load_more(&self) -> bool {
        self.sentinel.is_some() && self.nodes[ROOT.0].children.last() == self.sentinel.as_ref()
    }

    /// Show or hide the sentinel. Returns whether the tree changed.
    pub fn set_load_more(&mut self, present: bool) -> bool {
        if present == self.has_load_more() {
            return false;
        }
        if present {
            let sentinel = match self.sentinel {
                Some(sentinel) => sentinel,
                None => {
                    let sentinel = self.alloc(NodeValue::LoadMore);
                    self.sentinel = Some(sentinel);
                    sentinel
                }
            };
            self.nodes[ROOT.0].children.push(sentinel);
        } else {
            self.nodes[ROOT.0].children.pop();
        }
        true
    }

    pub fn is_load_more(&self, node: NodeId) -> bool {
        self.sentinel == Some(node)
    }

    pub fn contains_result(&self, product_name: &str, file_path: &str) -> bool {
        self.results()
            .any(|(_, r)| r.dedup_key() == (product_name, file_path))
    }

    /// Results directly under the root, in display order
    pub fn results(&self) -> impl Iterator<Item = (NodeId, &SearchResult)> {
        self.nodes[ROOT.0]
            .children
            .iter()
            .filter_map(|id| self.nodes[id.0].value.as_result().map(|r| (*id, r)))
    }

    pub fn result_count(&self) -> usize {
        self.results().count()
    }

    pub fn result_mut(&mut self, node: NodeId) -> Option<&mut SearchResult> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.value) {
            Some(NodeValue::Result(result)) => Some(result),
            _ => None,
        }
    }

    pub fn facets(&self) -> impl Iterator<Item = &SearchFacet> {
        self.nodes[ROOT.0]
            .children
            .iter()
            .filter_map(|id| self.nodes[id.0].value.as_facet())
    }
}

impl TreeModel for ResultTree {
    fn root(&self) -> NodeId {
        ROOT
    }

    fn child_count(&self, parent: NodeId) -> usize {
        self.nodes.get(parent.0).map_or(0, |n| n.children.len())
    }

    fn child(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.nodes.get(parent.0)?.children.get(index).copied()
    }

    fn value(&self, node: NodeId) -> Option<&NodeValue> {
        self.nodes.get(node.0).map(|n| &n.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(path: &str) -> SearchResult {
        SearchResult::new(path, path).with_product("p")
    }

    #[test]
    fn test_sentinel_stays_last() {
        let mut tree = ResultTree::new("results");
        tree.push_result(result("a"));
        assert!(tree.set_load_more(true));
        assert!(!tree.set_load_more(true));
        tree.push_result(result("b"));

        let root = tree.root();
        assert_eq!(tree.child_count(root), 3);
        let last = tree.child(root, 2).unwrap();
        assert!(tree.is_load_more(last));
        assert_eq!(tree.value(last), Some(&NodeValue::LoadMore));
        assert_eq!(tree.result_count(), 2);
    }

    #[test]
    fn test_sentinel_is_reused() {
        let mut tree = ResultTree::new("results");
        tree.set_load_more(true);
        let first = tree.child(tree.root(), 0).unwrap();
        assert!(tree.set_load_more(false));
        assert!(!tree.has_load_more());
        tree.set_load_more(true);
        assert_eq!(tree.child(tree.root(), 0), Some(first));
    }

    #[test]
    fn test_nested_push_and_leaf() {
        let mut tree = ResultTree::new("root");
        let group = tree.push(tree.root(), NodeValue::Label("group".into())).unwrap();
        let leaf = tree.push(group, NodeValue::Result(result("x"))).unwrap();

        assert!(!tree.is_leaf(group));
        assert!(tree.is_leaf(leaf));
        assert_eq!(tree.push(NodeId(99), NodeValue::Label("lost".into())), None);
    }

    #[test]
    fn test_push_refuses_sentinel() {
        let mut tree = ResultTree::new("results");
        let root = tree.root();
        assert_eq!(tree.push(root, NodeValue::LoadMore), None);
        tree.push_result(result("a"));
        assert!(tree.set_load_more(true));

        let sentinels = (0..tree.child_count(root))
            .filter_map(|i| tree.child(root, i))
            .filter(|id| matches!(tree.value(*id), Some(NodeValue::LoadMore)))
            .count();
        assert_eq!(sentinels, 1);
        assert!(tree.has_load_more());
    }

    #[test]
    fn test_contains_and_mutate_result() {
        let mut tree = ResultTree::new("results");
        let id = tree.push_result(result("a"));
        assert!(tree.contains_result("p", "a"));
        assert!(!tree.contains_result("q", "a"));

        tree.result_mut(id).unwrap().fill_content("body".into());
        let stored = tree.value(id).and_then(NodeValue::as_result).unwrap();
        assert_eq!(stored.content(), Some("body"));
    }

    #[test]
    fn test_reset() {
        let mut tree = ResultTree::new("old");
        tree.push_result(result("a"));
        tree.set_load_more(true);
        tree.reset("new");

        assert_eq!(tree.label(), "new");
        assert_eq!(tree.child_count(tree.root()), 0);
        assert!(!tree.has_load_more());
    }
}
