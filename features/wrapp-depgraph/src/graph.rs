use std::{
    collections::HashMap,
    fmt::{self, Debug},
    hash::{Hash, Hasher},
};

use petgraph::{dot::Dot, graph::DiGraph};

use crate::types::{ComponentIdentity, DependencyDeclaration, ResolutionUrgency};

/// Index of a node inside the [`Graph`] that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);
impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Outgoing edge of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub(crate) target: NodeId,
    pub(crate) urgency: ResolutionUrgency,
    pub(crate) declared: ComponentIdentity,
}
impl Edge {
    /// The node the edge points to - always the bound implementation
    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn urgency(&self) -> ResolutionUrgency {
        self.urgency
    }

    /// The identity as written in the declaration, before binding resolution
    pub fn declared(&self) -> &ComponentIdentity {
        &self.declared
    }
}

#[derive(Debug)]
pub(crate) struct NodeEntry {
    pub(crate) declaration: DependencyDeclaration,
    pub(crate) edges: Vec<Edge>,
    pub(crate) incoming: usize,
}

/// Graph of all components reachable from the declarations it was built from
///
/// Holds exactly one node per [`ComponentIdentity`]. Immutable once built - a changed
/// component set needs a new graph.
#[derive(Debug, Default)]
pub struct Graph {
    entries: Vec<NodeEntry>,
    index: HashMap<ComponentIdentity, NodeId>,
}
impl Graph {
    pub(crate) fn from_entries(mut entries: Vec<NodeEntry>) -> Self {
        let mut incoming = vec![0; entries.len()];
        for edge in entries.iter().flat_map(|entry| &entry.edges) {
            incoming[edge.target.0] += 1;
        }
        for (entry, count) in entries.iter_mut().zip(incoming) {
            entry.incoming = count;
        }

        let index = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.declaration.identity().clone(), NodeId(position)))
            .collect();

        Graph { entries, index }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All nodes, in the order they were added
    pub fn nodes(&self) -> Vec<GraphNode<'_>> {
        (0..self.entries.len())
            .map(|position| self.at(NodeId(position)))
            .collect()
    }

    /// Nodes nothing else in the graph depends on
    pub fn roots(&self) -> Vec<GraphNode<'_>> {
        self.nodes()
            .into_iter()
            .filter(GraphNode::is_root)
            .collect()
    }

    pub fn node(&self, identity: &ComponentIdentity) -> Option<GraphNode<'_>> {
        self.index.get(identity).map(|id| self.at(*id))
    }

    pub fn get(&self, id: NodeId) -> Option<GraphNode<'_>> {
        (id.0 < self.entries.len()).then(|| self.at(id))
    }

    pub fn contains(&self, identity: &ComponentIdentity) -> bool {
        self.index.contains_key(identity)
    }

    /// Copy of the graph as a petgraph [`DiGraph`], node indices match [`NodeId`]s
    pub fn to_petgraph(&self) -> DiGraph<ComponentIdentity, ResolutionUrgency> {
        let mut exported = DiGraph::with_capacity(self.entries.len(), self.edge_count());
        let indices: Vec<_> = self
            .entries
            .iter()
            .map(|entry| exported.add_node(entry.declaration.identity().clone()))
            .collect();

        for (source, entry) in self.entries.iter().enumerate() {
            for edge in &entry.edges {
                exported.add_edge(indices[source], indices[edge.target.0], edge.urgency);
            }
        }
        exported
    }

    /// Renders the graph in graphviz dot format
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.to_petgraph()))
    }

    fn edge_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.edges.len()).sum()
    }

    /// Only called with ids handed out by this graph
    pub(crate) fn at(&self, id: NodeId) -> GraphNode<'_> {
        GraphNode { graph: self, id }
    }

    fn entry(&self, id: NodeId) -> &NodeEntry {
        &self.entries[id.0]
    }
}

/// View of a single node of a [`Graph`]
#[derive(Clone, Copy)]
pub struct GraphNode<'g> {
    graph: &'g Graph,
    id: NodeId,
}
impl<'g> GraphNode<'g> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn identity(&self) -> &'g ComponentIdentity {
        self.graph.entry(self.id).declaration.identity()
    }

    pub fn declaration(&self) -> &'g DependencyDeclaration {
        &self.graph.entry(self.id).declaration
    }

    /// Outgoing edges in declaration order
    pub fn edges(&self) -> &'g [Edge] {
        &self.graph.entry(self.id).edges
    }

    /// The node an outgoing edge points to
    pub fn follow(&self, edge: &Edge) -> GraphNode<'g> {
        self.graph.at(edge.target)
    }

    /// Resolved dependencies in declaration order
    pub fn children(&self) -> impl Iterator<Item = GraphNode<'g>> + 'g {
        let graph = self.graph;
        self.edges().iter().map(move |edge| graph.at(edge.target))
    }

    pub fn incoming_count(&self) -> usize {
        self.graph.entry(self.id).incoming
    }

    pub fn is_root(&self) -> bool {
        self.incoming_count() == 0
    }
}
impl PartialEq for GraphNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}
impl Eq for GraphNode<'_> {}
impl Hash for GraphNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl Debug for GraphNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<String> = self
            .children()
            .map(|child| child.identity().to_string())
            .collect();
        f.debug_struct("GraphNode")
            .field("identity", &self.identity().to_string())
            .field("children", &children)
            .finish()
    }
}
impl fmt::Display for GraphNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.identity(), f)
    }
}
