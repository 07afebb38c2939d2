use std::collections::HashMap;

use crate::{errors::BindingError, types::ComponentIdentity};

/// Maps abstract components to their implementation
pub trait BindingResolver {
    /// Returns the bound implementation, `None` if the identity is unbound
    fn resolve(&self, identity: &ComponentIdentity) -> Option<ComponentIdentity>;

    /// Returns the bound implementation, or the identity itself if unbound
    fn resolve_or_self(&self, identity: &ComponentIdentity) -> ComponentIdentity {
        self.resolve(identity)
            .unwrap_or_else(|| identity.clone())
    }
}

/// Resolver without any bindings - every identity is self-bound
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBindings;
impl BindingResolver for NoBindings {
    fn resolve(&self, _identity: &ComponentIdentity) -> Option<ComponentIdentity> {
        None
    }
}

/// Binding table
///
/// Bindings chain: if the implementation is itself bound, resolution follows it
/// until it reaches an unbound identity.
#[derive(Debug, Default, Clone)]
pub struct Bindings {
    table: HashMap<ComponentIdentity, ComponentIdentity>,
}
impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an abstract identity to its implementation
    ///
    /// Rebinding to the same implementation is a no-op, rebinding to another one
    /// returns [`BindingError::AlreadyBound`]. A binding whose implementation
    /// resolves back to `identity` returns [`BindingError::Loop`]
    pub fn bind(
        &mut self,
        identity: ComponentIdentity,
        implementation: ComponentIdentity,
    ) -> Result<&mut Self, BindingError> {
        if let Some(existing) = self.table.get(&identity) {
            if *existing == implementation {
                return Ok(self);
            }
            return Err(BindingError::AlreadyBound {
                identity,
                existing: existing.clone(),
                requested: implementation,
            });
        }
        // Unbound identities already resolve to themselves
        if identity == implementation {
            return Ok(self);
        }
        if self.resolve_or_self(&implementation) == identity {
            return Err(BindingError::Loop {
                identity,
                implementation,
            });
        }

        tracing::debug!("Binding {} to {}", identity, implementation);
        self.table.insert(identity, implementation);
        Ok(self)
    }

    /// Bind a trait object (or any other type) to a concrete type
    pub fn bind_type<Abstract: 'static + ?Sized, Implementation: 'static>(
        &mut self,
    ) -> Result<&mut Self, BindingError> {
        self.bind(
            ComponentIdentity::of::<Abstract>(),
            ComponentIdentity::of::<Implementation>(),
        )
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
impl BindingResolver for Bindings {
    fn resolve(&self, identity: &ComponentIdentity) -> Option<ComponentIdentity> {
        let mut current = self.table.get(identity)?;
        // bind() never closes a loop, so a chain is at most as long as the table
        for _ in 0..self.table.len() {
            match self.table.get(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        Some(current.clone())
    }
}
