use std::collections::{HashMap, VecDeque};

use crate::{
    binding::BindingResolver,
    config::GraphConfig,
    errors::{DependencyGraphError, DependencyGraphErrors},
    graph::{Edge, Graph, NodeEntry, NodeId},
    provider::MetadataProvider,
    types::{ComponentIdentity, DependencyDeclaration, DependencyInfo, ResolutionUrgency},
};

/// Builds a [`Graph`] from dependency declarations
///
/// Every dependency is resolved through the binding resolver before it becomes an
/// edge. Components that are required but were not declared are requested from the
/// metadata provider, so the graph holds the full transitive closure.
pub struct DependencyGraphBuilder<'a> {
    provider: &'a dyn MetadataProvider,
    bindings: &'a dyn BindingResolver,
    config: GraphConfig,
}
impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(provider: &'a dyn MetadataProvider, bindings: &'a dyn BindingResolver) -> Self {
        DependencyGraphBuilder {
            provider,
            bindings,
            config: GraphConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Build the graph of the given declarations and everything they require
    ///
    /// Returns all missing dependencies and conflicting declarations at once
    pub fn build(
        &self,
        declarations: impl IntoIterator<Item = DependencyDeclaration>,
    ) -> Result<Graph, DependencyGraphErrors> {
        let mut state = BuildState::default();
        for declaration in declarations {
            state.declare(declaration);
        }

        tracing::debug!(
            "Building dependency graph from {} declarations",
            state.entries.len()
        );

        while let Some(id) = state.queue.pop_front() {
            self.connect(&mut state, id);
        }

        if !state.errors.is_empty() {
            return Err(DependencyGraphErrors {
                errors: state.errors,
            });
        }

        let graph = Graph::from_entries(state.entries);
        tracing::debug!(
            "Dependency graph built with {} nodes and {} roots",
            graph.len(),
            graph.roots().len()
        );
        Ok(graph)
    }

    /// Build the graph starting from components known to the metadata provider
    pub fn build_from(
        &self,
        identities: impl IntoIterator<Item = ComponentIdentity>,
    ) -> Result<Graph, DependencyGraphErrors> {
        let mut declarations = Vec::new();
        let mut errors = Vec::new();
        for identity in identities {
            match self.provider.declaration(&identity) {
                Some(declaration) => declarations.push(declaration),
                None => {
                    tracing::warn!("No declaration is known for '{}'", identity);
                    errors.push(DependencyGraphError::UnknownComponent(identity));
                }
            }
        }

        if !errors.is_empty() {
            return Err(DependencyGraphErrors { errors });
        }
        self.build(declarations)
    }

    /// Attach all outgoing edges of a node, declaring new nodes on the way
    fn connect(&self, state: &mut BuildState, id: NodeId) {
        let declaration = &state.entries[id.0].declaration;
        let identity = declaration.identity().clone();
        let dependencies = declaration.dependencies().to_vec();

        // An abstract declaration depends on its implementation
        if let Some(implementation) = self.bindings.resolve(&identity) {
            if implementation != identity {
                let binding = DependencyInfo::immediate(identity.clone());
                self.link(state, id, &identity, &binding, implementation);
            }
        }

        for dependency in &dependencies {
            let target = self.bindings.resolve_or_self(&dependency.identity);
            self.link(state, id, &identity, dependency, target);
        }
    }

    fn link(
        &self,
        state: &mut BuildState,
        source: NodeId,
        required_by: &ComponentIdentity,
        dependency: &DependencyInfo,
        target: ComponentIdentity,
    ) {
        let target_id = match state.index.get(&target) {
            Some(target_id) => *target_id,
            None => match self.expand(&target) {
                Some(declaration) => state.declare(declaration),
                None if dependency.optional => {
                    tracing::debug!(
                        "Optional dependency '{}' of '{}' is missing - skipping",
                        target,
                        required_by
                    );
                    return;
                }
                None => {
                    tracing::warn!("'{}' needs '{}' but it is missing", required_by, target);
                    state.errors.push(DependencyGraphError::MissingDependency {
                        dependency: target,
                        required_by: required_by.clone(),
                    });
                    return;
                }
            },
        };

        let edges = &mut state.entries[source.0].edges;
        match edges.iter_mut().find(|edge| edge.target == target_id) {
            // Required twice - the stricter urgency wins
            Some(existing) => {
                if dependency.urgency == ResolutionUrgency::Immediate {
                    existing.urgency = ResolutionUrgency::Immediate;
                }
            }
            None => edges.push(Edge {
                target: target_id,
                urgency: dependency.urgency,
                declared: dependency.identity.clone(),
            }),
        }
    }

    /// Ask the metadata provider for a component nobody declared
    fn expand(&self, identity: &ComponentIdentity) -> Option<DependencyDeclaration> {
        if !self.config.expand_missing {
            return None;
        }

        let declaration = self.provider.declaration(identity)?;
        if declaration.identity() != identity {
            tracing::warn!(
                "Metadata provider answered '{}' with a declaration for '{}' - ignoring it",
                identity,
                declaration.identity()
            );
            return None;
        }

        tracing::debug!("Expanded missing declaration for '{}'", identity);
        Some(declaration)
    }
}

#[derive(Default)]
struct BuildState {
    entries: Vec<NodeEntry>,
    index: HashMap<ComponentIdentity, NodeId>,
    /// Nodes whose edges have not been attached yet
    queue: VecDeque<NodeId>,
    errors: Vec<DependencyGraphError>,
}
impl BuildState {
    /// Returns the node of the declared component, creating it if it's new
    fn declare(&mut self, declaration: DependencyDeclaration) -> NodeId {
        if let Some(id) = self.index.get(declaration.identity()) {
            let existing = &self.entries[id.0].declaration;
            if !existing.is_equivalent(&declaration) {
                self.errors.push(DependencyGraphError::Duplicate(
                    declaration.identity().clone(),
                ));
            }
            return *id;
        }

        let id = NodeId(self.entries.len());
        self.index.insert(declaration.identity().clone(), id);
        self.entries.push(NodeEntry {
            declaration,
            edges: Vec::new(),
            incoming: 0,
        });
        self.queue.push_back(id);
        id
    }
}
