use thiserror::Error;

use crate::{discovery::ComponentDiscoveryList, types::ComponentIdentity};

/// A single issue with the dependency graph
#[derive(Error, Debug, Clone)]
pub enum DependencyGraphError {
    /// The same component was declared twice with different dependencies
    #[error("A Component has been declared twice with different dependencies: '{0}'")]
    Duplicate(ComponentIdentity),
    /// A starting component has no declaration in the metadata provider
    #[error("No declaration is known for '{0}'")]
    UnknownComponent(ComponentIdentity),
    /// A required dependency has no declaration and none could be provided
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency {
        dependency: ComponentIdentity,
        required_by: ComponentIdentity,
    },
    /// A cycle with at least one immediate edge
    #[error("A Circular Dependency exists through {cycle} - Consider using a delayed dependency")]
    CircularDependency { cycle: ComponentDiscoveryList },
}

/// All issues found while building or checking a graph
#[derive(Error, Debug, Clone)]
pub struct DependencyGraphErrors {
    pub errors: Vec<DependencyGraphError>,
}
impl std::fmt::Display for DependencyGraphErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}
impl From<DependencyGraphError> for DependencyGraphErrors {
    fn from(error: DependencyGraphError) -> Self {
        DependencyGraphErrors {
            errors: vec![error],
        }
    }
}
impl DependencyGraphErrors {
    /// Identities that could not be resolved, with the component requiring them
    pub fn missing(&self) -> impl Iterator<Item = (&ComponentIdentity, &ComponentIdentity)> + '_ {
        self.errors.iter().filter_map(|error| match error {
            DependencyGraphError::MissingDependency {
                dependency,
                required_by,
            } => Some((dependency, required_by)),
            _ => None,
        })
    }

    /// Discovery lists of all fatal cycles
    pub fn cycles(&self) -> impl Iterator<Item = &ComponentDiscoveryList> + '_ {
        self.errors.iter().filter_map(|error| match error {
            DependencyGraphError::CircularDependency { cycle } => Some(cycle),
            _ => None,
        })
    }
}

/// Errors when registering a binding
#[derive(Error, Debug, Clone)]
pub enum BindingError {
    /// The abstract identity is already bound to another implementation
    #[error("'{identity}' is already bound to '{existing}', can't bind it to '{requested}'")]
    AlreadyBound {
        identity: ComponentIdentity,
        existing: ComponentIdentity,
        requested: ComponentIdentity,
    },
    /// The implementation already resolves back to the abstract identity
    #[error("Binding '{identity}' to '{implementation}' would close a binding loop")]
    Loop {
        identity: ComponentIdentity,
        implementation: ComponentIdentity,
    },
}

/// Errors when registering a declaration
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// A different declaration for the same component is already registered
    #[error("A declaration for '{0}' is already registered")]
    AlreadyRegistered(ComponentIdentity),
}
