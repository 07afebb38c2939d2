//! Wrapp Depgraph builds the dependency graph of all components of a Wrapp
//! application and checks it for circular dependencies before anything is constructed.
//!
//! Wrapp Depgraph is split into three major parts:
//! 1. DependencyGraphBuilder: turns declarations into a [`Graph`], resolving bindings
//!    and pulling in undeclared components from a [`MetadataProvider`]
//! 2. CyclicDependencyValidator: walks the graph and reports cycles
//! 3. SharedGraph: publishes rebuilt graphs to concurrent readers
//!
//! Dependencies are either immediate (constructor parameters) or delayed (fields,
//! setters). A cycle is only fatal if one of its edges is immediate - a delayed cycle
//! can be wired after construction.
//!
//! # Examples
//!
//! ```rust
//! use wrapp_depgraph::{
//!     ComponentIdentity, CyclicDependencyValidator, DeclarationRegistry,
//!     DependencyDeclaration, DependencyGraphBuilder, NoBindings,
//! };
//!
//! let a = ComponentIdentity::named("A");
//! let b = ComponentIdentity::named("B");
//!
//! let registry = DeclarationRegistry::new();
//! let graph = DependencyGraphBuilder::new(&registry, &NoBindings)
//!     .build([
//!         DependencyDeclaration::new(a.clone()).immediate(b.clone()),
//!         DependencyDeclaration::new(b.clone()).immediate(a.clone()),
//!     ])
//!     .unwrap();
//!
//! let validator = CyclicDependencyValidator::new(&graph);
//! let path = validator.walk(graph.node(&a).unwrap());
//! let cycle = validator.discovery_list(&path);
//!
//! assert_eq!(cycle.to_string(), "A -> B -> A");
//! assert!(validator.check().is_err());
//! ```

pub mod binding;
pub mod builder;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod graph;
pub mod provider;
pub mod shared;
pub mod types;
pub mod validator;

pub use binding::{BindingResolver, Bindings, NoBindings};
pub use builder::DependencyGraphBuilder;
pub use config::GraphConfig;
pub use discovery::{ComponentDiscoveryList, DiscoveredComponent};
pub use errors::{BindingError, DependencyGraphError, DependencyGraphErrors, ProviderError};
pub use graph::{Edge, Graph, GraphNode, NodeId};
pub use provider::{Component, DeclarationRegistry, MetadataProvider};
pub use shared::SharedGraph;
pub use types::{
    ComponentIdentity, DependencyDeclaration, DependencyInfo, ResolutionUrgency, TypeInfo,
};
pub use validator::{CyclicDependencyValidator, Path, PathStep};
