use std::{any::TypeId, borrow::Cow, collections::HashSet, fmt};

/// Type Name and, if derived from a Rust type, its Type Id
///
/// Identities produced by external metadata only carry a name.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeInfo {
    pub type_name: Cow<'static, str>,
    pub type_id: Option<TypeId>,
}
impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: Cow::Borrowed(std::any::type_name::<T>()),
            type_id: Some(TypeId::of::<T>()),
        }
    }

    pub fn named(type_name: impl Into<Cow<'static, str>>) -> TypeInfo {
        TypeInfo {
            type_name: type_name.into(),
            type_id: None,
        }
    }
}

/// Key of a component: its type plus an optional qualifier
///
/// Two identities are the same component if both the type and the qualifier match.
/// The ordering is by type name first, so sorted output reads alphabetically.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ComponentIdentity {
    type_info: TypeInfo,
    qualifier: Option<Cow<'static, str>>,
}
impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}[{}]", self.type_info, qualifier),
            None => write!(f, "{}", self.type_info),
        }
    }
}
impl From<TypeInfo> for ComponentIdentity {
    fn from(type_info: TypeInfo) -> Self {
        ComponentIdentity {
            type_info,
            qualifier: None,
        }
    }
}
impl ComponentIdentity {
    /// Identity of a Rust type, `dyn Trait` included
    pub fn of<T: 'static + ?Sized>() -> Self {
        TypeInfo::of::<T>().into()
    }

    /// Identity known only by name
    pub fn named(type_name: impl Into<Cow<'static, str>>) -> Self {
        TypeInfo::named(type_name).into()
    }

    pub fn qualified(mut self, qualifier: impl Into<Cow<'static, str>>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    pub fn type_name(&self) -> &str {
        &self.type_info.type_name
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

/// When a dependency has to be available
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResolutionUrgency {
    /// Must be fully constructed before the dependent is constructed (constructor parameter)
    Immediate,
    /// Injected into an already constructed dependent (field / setter), may be forwarded later
    Delayed,
}
impl fmt::Display for ResolutionUrgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionUrgency::Immediate => f.write_str("immediate"),
            ResolutionUrgency::Delayed => f.write_str("delayed"),
        }
    }
}

/// Information about a single dependency of a component
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct DependencyInfo {
    /// The required component, as written - possibly an abstract identity
    pub identity: ComponentIdentity,
    /// When it is required
    pub urgency: ResolutionUrgency,
    /// If it is optional or required
    pub optional: bool,
}
impl DependencyInfo {
    pub fn immediate(identity: ComponentIdentity) -> Self {
        DependencyInfo {
            identity,
            urgency: ResolutionUrgency::Immediate,
            optional: false,
        }
    }

    pub fn delayed(identity: ComponentIdentity) -> Self {
        DependencyInfo {
            identity,
            urgency: ResolutionUrgency::Delayed,
            optional: false,
        }
    }

    /// Marks the dependency as optional - a missing optional dependency is skipped
    pub fn optional(self) -> Self {
        DependencyInfo {
            optional: true,
            ..self
        }
    }
}

/// Everything a component needs, as extracted by the metadata layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    identity: ComponentIdentity,
    dependencies: Vec<DependencyInfo>,
    /// Where the declaration came from, only used for diagnostics
    origin: Option<Cow<'static, str>>,
}
impl DependencyDeclaration {
    pub fn new(identity: ComponentIdentity) -> Self {
        DependencyDeclaration {
            identity,
            dependencies: Vec::new(),
            origin: None,
        }
    }

    pub fn of<T: 'static + ?Sized>() -> Self {
        Self::new(ComponentIdentity::of::<T>())
    }

    pub fn immediate(self, identity: ComponentIdentity) -> Self {
        self.with(DependencyInfo::immediate(identity))
    }

    pub fn delayed(self, identity: ComponentIdentity) -> Self {
        self.with(DependencyInfo::delayed(identity))
    }

    pub fn with(mut self, dependency: DependencyInfo) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = DependencyInfo>) -> Self {
        self.dependencies.extend(dependencies);
        self
    }

    pub fn with_origin(mut self, origin: impl Into<Cow<'static, str>>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn identity(&self) -> &ComponentIdentity {
        &self.identity
    }

    /// All dependencies in declaration order
    pub fn dependencies(&self) -> &[DependencyInfo] {
        &self.dependencies
    }

    /// Dependencies of one urgency bucket, in declaration order
    pub fn dependencies_with(
        &self,
        urgency: ResolutionUrgency,
    ) -> impl Iterator<Item = &DependencyInfo> + '_ {
        self.dependencies
            .iter()
            .filter(move |dependency| dependency.urgency == urgency)
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// True if both declare the same component with the same set of dependencies.
    /// Order, repeated entries and the origin are ignored.
    pub fn is_equivalent(&self, other: &DependencyDeclaration) -> bool {
        self.identity == other.identity
            && self.dependencies.iter().collect::<HashSet<_>>()
                == other.dependencies.iter().collect::<HashSet<_>>()
    }
}
