use std::fmt;

use crate::types::ComponentIdentity;

/// A component met while walking a cycle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveredComponent {
    declared: ComponentIdentity,
    actual: ComponentIdentity,
}
impl DiscoveredComponent {
    pub fn new(declared: ComponentIdentity, actual: ComponentIdentity) -> Self {
        DiscoveredComponent { declared, actual }
    }

    /// The identity as written in the dependent's declaration
    pub fn declared(&self) -> &ComponentIdentity {
        &self.declared
    }

    /// The identity after binding resolution
    pub fn actual(&self) -> &ComponentIdentity {
        &self.actual
    }

    /// True if the declared identity was bound to a different implementation
    pub fn is_bound(&self) -> bool {
        self.declared != self.actual
    }
}
impl fmt::Display for DiscoveredComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bound() {
            write!(f, "{} ({})", self.declared, self.actual)
        } else {
            write!(f, "{}", self.actual)
        }
    }
}

/// Ordered report of the members of a fatal cycle
///
/// The full view repeats the first member at the end, the deduplicated view lists
/// every member once. An empty list means there was nothing fatal to report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentDiscoveryList {
    /// Full view - the last entry closes the loop
    entries: Vec<DiscoveredComponent>,
}
impl ComponentDiscoveryList {
    /// Builds a list from the cycle members, appending the closing duplicate
    pub(crate) fn closed(mut members: Vec<DiscoveredComponent>) -> Self {
        if let Some(first) = members.first().cloned() {
            members.push(first);
        }
        ComponentDiscoveryList { entries: members }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct cycle members
    pub fn len(&self) -> usize {
        self.deduplicated().len()
    }

    /// Cycle members, each listed once
    pub fn deduplicated(&self) -> &[DiscoveredComponent] {
        match self.entries.split_last() {
            Some((_, members)) => members,
            None => &[],
        }
    }

    /// Cycle members followed by the member that closes the loop
    pub fn full(&self) -> &[DiscoveredComponent] {
        &self.entries
    }

    /// Resolved identities of the cycle members
    pub fn actual_identities(&self) -> impl Iterator<Item = &ComponentIdentity> + '_ {
        self.deduplicated().iter().map(DiscoveredComponent::actual)
    }
}
impl fmt::Display for ComponentDiscoveryList {
    /// Renders the full view as `A -> B -> A`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain: Vec<String> = self.entries.iter().map(ToString::to_string).collect();
        f.write_str(&chain.join(" -> "))
    }
}
