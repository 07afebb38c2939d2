use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::{
    builder::DependencyGraphBuilder, errors::DependencyGraphErrors, graph::Graph,
    types::DependencyDeclaration, validator::CyclicDependencyValidator,
};

/// The graph the rest of the container reads, swappable on rebuild
///
/// Readers always see a complete graph: a new graph is only published once it was
/// fully built and checked.
pub struct SharedGraph {
    current: ArcSwap<Graph>,
}
impl Default for SharedGraph {
    fn default() -> Self {
        Self::new(Graph::default())
    }
}
impl SharedGraph {
    pub fn new(graph: Graph) -> Self {
        SharedGraph {
            current: ArcSwap::from_pointee(graph),
        }
    }

    /// Snapshot of the current graph
    pub fn load(&self) -> Arc<Graph> {
        self.current.load_full()
    }

    /// Publish a new graph, returning the previous one
    pub fn replace(&self, graph: Graph) -> Arc<Graph> {
        self.current.swap(Arc::new(graph))
    }

    /// Build and check a new graph, then publish it
    ///
    /// On error the current graph stays in place
    pub fn rebuild(
        &self,
        builder: &DependencyGraphBuilder<'_>,
        declarations: impl IntoIterator<Item = DependencyDeclaration>,
    ) -> Result<Arc<Graph>, DependencyGraphErrors> {
        let graph = builder.build(declarations)?;
        CyclicDependencyValidator::new(&graph)
            .with_config(*builder.config())
            .check()?;

        let graph = Arc::new(graph);
        self.current.store(graph.clone());
        tracing::debug!("Published rebuilt dependency graph with {} nodes", graph.len());
        Ok(graph)
    }
}
