//! Option graph.
//!
//! A node-graph of labeled choices built on top of the action chain: used
//! for branching dialogue, disambiguation, and multi-stage menus. Every
//! option target is validated when the graph is built or augmented; an
//! unresolvable id is corrupt content authoring, never a runtime no-op.

use std::collections::HashSet;

use thiserror::Error;

use crate::chain::ActionChain;

/// Authoring mistakes in a graph definition. Fatal: these never reach the
/// player as chain text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("option graph has no nodes")]
    Empty,
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),
    #[error("option '{label}' on node '{node}' targets unknown node '{target}'")]
    UnresolvedTarget {
        node: String,
        label: String,
        target: String,
    },
    #[error("no node with id '{0}' in graph")]
    UnknownNode(String),
}

/// One labeled choice offered by a node: a destination id, optionally with
/// inline actions run before the transition.
#[derive(Debug, Clone)]
pub struct NodeOption {
    pub label: String,
    pub target: String,
    pub actions: Option<ActionChain>,
}

impl NodeOption {
    pub fn new(label: &str, target: &str) -> Self {
        Self {
            label: label.to_string(),
            target: target.to_string(),
            actions: None,
        }
    }

    pub fn with_actions(mut self, actions: ActionChain) -> Self {
        self.actions = Some(actions);
        self
    }
}

/// A graph node: entry actions plus the choices it offers.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub id: String,
    pub actions: ActionChain,
    pub options: Vec<NodeOption>,
    /// Per-node override of the graph's repeat default. A non-repeatable
    /// node, once visited, is never offered as a choice again.
    pub repeat: Option<bool>,
}

impl GraphNode {
    pub fn new(id: &str, actions: ActionChain) -> Self {
        Self {
            id: id.to_string(),
            actions,
            options: Vec::new(),
            repeat: None,
        }
    }

    pub fn with_option(mut self, option: NodeOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn no_repeat(mut self) -> Self {
        self.repeat = Some(false);
        self
    }

    pub fn allow_repeat(mut self) -> Self {
        self.repeat = Some(true);
        self
    }
}

/// A validated graph of nodes. The start node defaults to the first node
/// given; `commence` on the runner can enter at any id.
#[derive(Debug, Clone)]
pub struct OptionGraph {
    nodes: Vec<GraphNode>,
    start: String,
    default_repeat: bool,
}

impl OptionGraph {
    /// Build and validate a graph. Targets may reference any node in the
    /// supplied set, forward or backward.
    pub fn new(nodes: Vec<GraphNode>) -> Result<Self, GraphError> {
        let start = nodes.first().ok_or(GraphError::Empty)?.id.clone();
        let mut seen: HashSet<&str> = HashSet::new();
        for node in &nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }
        for node in &nodes {
            for option in &node.options {
                if !seen.contains(option.target.as_str()) {
                    return Err(GraphError::UnresolvedTarget {
                        node: node.id.clone(),
                        label: option.label.clone(),
                        target: option.target.clone(),
                    });
                }
            }
        }
        Ok(Self {
            nodes,
            start,
            default_repeat: true,
        })
    }

    /// Graph-level repeat default, applied to nodes without an override.
    pub fn with_default_repeat(mut self, allow: bool) -> Self {
        self.default_repeat = allow;
        self
    }

    /// Augment a built graph with another node, validated against the
    /// existing nodes plus itself.
    pub fn add_node(&mut self, node: GraphNode) -> Result<(), GraphError> {
        if self.contains(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        for option in &node.options {
            if option.target != node.id && !self.contains(&option.target) {
                return Err(GraphError::UnresolvedTarget {
                    node: node.id.clone(),
                    label: option.label.clone(),
                    target: option.target.clone(),
                });
            }
        }
        self.nodes.push(node);
        Ok(())
    }

    pub fn set_start(&mut self, id: &str) -> Result<(), GraphError> {
        if !self.contains(id) {
            return Err(GraphError::UnknownNode(id.to_string()));
        }
        self.start = id.to_string();
        Ok(())
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Whether `node` may be re-entered after its first visit.
    pub(crate) fn allows_repeat(&self, node: &GraphNode) -> bool {
        node.repeat.unwrap_or(self.default_repeat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> GraphNode {
        GraphNode::new(id, ActionChain::text(format!("at {id}")))
    }

    #[test]
    fn new_rejects_empty_graph() {
        assert_eq!(OptionGraph::new(vec![]).unwrap_err(), GraphError::Empty);
    }

    #[test]
    fn new_rejects_duplicate_ids() {
        let err = OptionGraph::new(vec![node("a"), node("a")]).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode("a".into()));
    }

    #[test]
    fn new_rejects_unresolved_target() {
        let bad = node("a").with_option(NodeOption::new("Go", "missing"));
        let err = OptionGraph::new(vec![bad]).unwrap_err();
        assert_eq!(
            err,
            GraphError::UnresolvedTarget {
                node: "a".into(),
                label: "Go".into(),
                target: "missing".into(),
            }
        );
    }

    #[test]
    fn new_allows_forward_references() {
        let first = node("a").with_option(NodeOption::new("On", "b"));
        let graph = OptionGraph::new(vec![first, node("b")]).expect("valid graph");
        assert_eq!(graph.start(), "a");
        assert!(graph.contains("b"));
    }

    #[test]
    fn add_node_validates_targets() {
        let mut graph = OptionGraph::new(vec![node("a")]).expect("valid graph");
        let bad = node("b").with_option(NodeOption::new("Go", "missing"));
        assert!(matches!(graph.add_node(bad), Err(GraphError::UnresolvedTarget { .. })));

        let self_loop = node("b").with_option(NodeOption::new("Again", "b"));
        assert!(graph.add_node(self_loop).is_ok());
    }

    #[test]
    fn set_start_requires_known_node() {
        let mut graph = OptionGraph::new(vec![node("a"), node("b")]).expect("valid graph");
        assert!(graph.set_start("b").is_ok());
        assert_eq!(graph.start(), "b");
        assert_eq!(graph.set_start("zzz").unwrap_err(), GraphError::UnknownNode("zzz".into()));
    }

    #[test]
    fn repeat_default_and_override() {
        let graph = OptionGraph::new(vec![node("a"), node("b").no_repeat()])
            .expect("valid graph")
            .with_default_repeat(true);
        let a = graph.node("a").expect("a");
        let b = graph.node("b").expect("b");
        assert!(graph.allows_repeat(a));
        assert!(!graph.allows_repeat(b));
    }
}
