use std::collections::HashMap;

use crate::{
    errors::ProviderError,
    types::{ComponentIdentity, DependencyDeclaration, DependencyInfo},
};

/// Source of dependency declarations
///
/// Asked by the graph builder whenever a required component has not been declared
/// up front.
pub trait MetadataProvider {
    /// Returns the declaration of the given component, if it is known
    fn declaration(&self, identity: &ComponentIdentity) -> Option<DependencyDeclaration>;
}
impl<F> MetadataProvider for F
where
    F: Fn(&ComponentIdentity) -> Option<DependencyDeclaration>,
{
    fn declaration(&self, identity: &ComponentIdentity) -> Option<DependencyDeclaration> {
        self(identity)
    }
}

/// A Rust type that can declare its own dependencies
pub trait Component: 'static {
    /// Returns the identity this component is registered under
    fn identity() -> ComponentIdentity {
        ComponentIdentity::of::<Self>()
    }

    /// Returns a list of dependencies the component requires.
    ///
    /// Constructor parameters are immediate, fields and setters are delayed.
    fn dependencies() -> Vec<DependencyInfo>;

    fn declaration() -> DependencyDeclaration {
        DependencyDeclaration::new(Self::identity())
            .with_dependencies(Self::dependencies())
            .with_origin(std::any::type_name::<Self>())
    }
}

/// In-memory registry of declarations
///
/// Declarations can be registered up front and are served to the builder on demand.
#[derive(Debug, Default, Clone)]
pub struct DeclarationRegistry {
    declarations: HashMap<ComponentIdentity, DependencyDeclaration>,
}

impl DeclarationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration to the registry.
    ///
    /// Registering an equivalent declaration twice is a no-op, a conflicting one
    /// returns [`ProviderError::AlreadyRegistered`]
    pub fn register(
        &mut self,
        declaration: DependencyDeclaration,
    ) -> Result<&mut Self, ProviderError> {
        if let Some(existing) = self.declarations.get(declaration.identity()) {
            if existing.is_equivalent(&declaration) {
                return Ok(self);
            }
            return Err(ProviderError::AlreadyRegistered(
                declaration.identity().clone(),
            ));
        }

        self.declarations
            .insert(declaration.identity().clone(), declaration);
        Ok(self)
    }

    /// Add the declaration of a [`Component`] to the registry
    pub fn register_component<C: Component>(&mut self) -> Result<&mut Self, ProviderError> {
        self.register(C::declaration())
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// All registered declarations, sorted by identity
    pub fn declarations(&self) -> Vec<DependencyDeclaration> {
        let mut declarations: Vec<_> = self.declarations.values().cloned().collect();
        declarations.sort_by(|a, b| a.identity().cmp(b.identity()));
        declarations
    }
}
impl MetadataProvider for DeclarationRegistry {
    fn declaration(&self, identity: &ComponentIdentity) -> Option<DependencyDeclaration> {
        self.declarations.get(identity).cloned()
    }
}
