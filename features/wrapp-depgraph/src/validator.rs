//! Cycle detection over a built [`Graph`].
//!
//! A cycle is only fatal if at least one of its edges is immediate: a purely delayed
//! cycle can be wired by injecting the dependencies after construction.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;

use crate::{
    config::GraphConfig,
    discovery::{ComponentDiscoveryList, DiscoveredComponent},
    errors::{DependencyGraphError, DependencyGraphErrors},
    graph::{Edge, Graph, GraphNode, NodeId},
    types::ResolutionUrgency,
};

/// One node on a walked path, with the edge that led to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep<'g> {
    pub node: GraphNode<'g>,
    /// `None` for the first step
    pub via: Option<&'g Edge>,
}

/// Result of [`CyclicDependencyValidator::walk`]
///
/// Empty if no cycle is reachable. Otherwise the steps from the start node up to and
/// including the node that was met a second time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path<'g> {
    steps: Vec<PathStep<'g>>,
    /// Position of the first occurrence of the repeated node
    cycle_start: usize,
}
impl<'g> Path<'g> {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[PathStep<'g>] {
        &self.steps
    }

    /// The cyclic part of the path, closed by the repeated node
    pub fn cycle(&self) -> &[PathStep<'g>] {
        self.steps.get(self.cycle_start..).unwrap_or_default()
    }

    /// Each member of the cycle once, starting at the repeated node
    pub fn cycle_members(&self) -> impl Iterator<Item = GraphNode<'g>> + '_ {
        let cycle = self.cycle();
        cycle[..cycle.len().saturating_sub(1)]
            .iter()
            .map(|step| step.node)
    }

    /// True if every edge of the cycle is delayed
    pub fn is_tolerable(&self) -> bool {
        self.cycle_edges()
            .all(|edge| edge.urgency() == ResolutionUrgency::Delayed)
    }

    fn cycle_edges(&self) -> impl Iterator<Item = &'g Edge> + '_ {
        self.cycle().iter().skip(1).filter_map(|step| step.via)
    }
}

struct Frame<'g> {
    step: PathStep<'g>,
    next_edge: usize,
}

/// Detects and classifies cycles
pub struct CyclicDependencyValidator<'g> {
    graph: &'g Graph,
    config: GraphConfig,
}
impl<'g> CyclicDependencyValidator<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        CyclicDependencyValidator {
            graph,
            config: GraphConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Depth-first walk from `start` until a node on the current path is met again
    ///
    /// Only the current path counts: a node reachable over two different routes is not
    /// a cycle. Subtrees that were fully explored are not entered twice, they can't
    /// lead to a cycle.
    pub fn walk(&self, start: GraphNode<'g>) -> Path<'g> {
        debug_assert!(
            std::ptr::eq(start.graph(), self.graph),
            "start node belongs to another graph"
        );

        let mut stack = vec![Frame {
            step: PathStep {
                node: start,
                via: None,
            },
            next_edge: 0,
        }];
        let mut on_path: HashMap<NodeId, usize> = HashMap::from([(start.id(), 0)]);
        let mut finished: HashSet<NodeId> = HashSet::new();

        while let Some(frame) = stack.last_mut() {
            let current = frame.step.node;
            let Some(edge) = current.edges().get(frame.next_edge) else {
                finished.insert(current.id());
                on_path.remove(&current.id());
                stack.pop();
                continue;
            };
            frame.next_edge += 1;

            let child = current.follow(edge);
            if let Some(&cycle_start) = on_path.get(&child.id()) {
                let mut steps: Vec<_> = stack.into_iter().map(|frame| frame.step).collect();
                steps.push(PathStep {
                    node: child,
                    via: Some(edge),
                });
                tracing::debug!(
                    "Walk from '{}' returned to '{}' after {} steps",
                    start,
                    child,
                    steps.len()
                );
                return Path { steps, cycle_start };
            }

            if finished.contains(&child.id()) {
                continue;
            }

            on_path.insert(child.id(), stack.len());
            stack.push(Frame {
                step: PathStep {
                    node: child,
                    via: Some(edge),
                },
                next_edge: 0,
            });
        }

        Path::default()
    }

    /// Reports the cycle of a walked path
    ///
    /// Empty for an acyclic path and for a cycle that only has delayed edges.
    /// Otherwise starts at the repeated node and pairs each member with the identity
    /// that was declared on the cycle edge leading to it.
    pub fn discovery_list(&self, path: &Path<'g>) -> ComponentDiscoveryList {
        let cycle = path.cycle();
        let Some((closing, members)) = cycle.split_last() else {
            return ComponentDiscoveryList::default();
        };

        if path.is_tolerable() {
            if self.config.report_tolerable_cycles {
                let chain: Vec<String> = cycle.iter().map(|step| step.node.to_string()).collect();
                tracing::info!(
                    "Tolerable circular dependency {} - it will be wired through delayed injection",
                    chain.join(" -> ")
                );
            }
            return ComponentDiscoveryList::default();
        }

        let discovered = members
            .iter()
            .enumerate()
            .map(|(position, step)| {
                // The first member is entered by the closing edge
                let entered_by = if position == 0 { closing.via } else { step.via };
                let actual = step.node.identity();
                let declared = entered_by.map_or(actual, Edge::declared);
                DiscoveredComponent::new(declared.clone(), actual.clone())
            })
            .collect();

        ComponentDiscoveryList::closed(discovered)
    }

    /// Validate the whole graph
    ///
    /// Every strongly connected component with an immediate edge inside it is reported
    /// as one [`DependencyGraphError::CircularDependency`], even if a walk would have
    /// stopped at a tolerable cycle first.
    pub fn check(&self) -> Result<(), DependencyGraphErrors> {
        let mut components: Vec<BTreeSet<NodeId>> = tarjan_scc(&self.graph.to_petgraph())
            .into_iter()
            .map(|component| component.into_iter().map(|index| NodeId(index.index())).collect())
            .collect();
        components.sort();

        let mut errors = Vec::new();
        for members in components {
            if !self.is_cyclic(&members) {
                continue;
            }

            match self.first_immediate_edge(&members) {
                Some((source, edge)) => {
                    let Some(path) = self.cycle_through(source, edge, &members) else {
                        continue;
                    };
                    let cycle = self.discovery_list(&path);
                    tracing::warn!("Fatal circular dependency: {}", cycle);
                    errors.push(DependencyGraphError::CircularDependency { cycle });
                }
                None if self.config.report_tolerable_cycles => {
                    let names: Vec<String> = members
                        .iter()
                        .map(|id| self.graph.at(*id).to_string())
                        .collect();
                    tracing::info!(
                        "Tolerable circular dependency between [{}]",
                        names.join(", ")
                    );
                }
                None => {}
            }
        }

        tracing::debug!(
            "Checked {} nodes - {} fatal circular dependencies",
            self.graph.len(),
            errors.len()
        );

        if !errors.is_empty() {
            return Err(DependencyGraphErrors { errors });
        }
        Ok(())
    }

    fn is_cyclic(&self, members: &BTreeSet<NodeId>) -> bool {
        match members.first() {
            Some(only) if members.len() == 1 => self
                .graph
                .at(*only)
                .edges()
                .iter()
                .any(|edge| edge.target() == *only),
            Some(_) => true,
            None => false,
        }
    }

    fn first_immediate_edge(
        &self,
        members: &BTreeSet<NodeId>,
    ) -> Option<(GraphNode<'g>, &'g Edge)> {
        members.iter().find_map(|id| {
            let node = self.graph.at(*id);
            node.edges()
                .iter()
                .find(|edge| {
                    edge.urgency() == ResolutionUrgency::Immediate
                        && members.contains(&edge.target())
                })
                .map(|edge| (node, edge))
        })
    }

    /// Shortest cycle through `edge`, staying inside `members`
    fn cycle_through(
        &self,
        source: GraphNode<'g>,
        edge: &'g Edge,
        members: &BTreeSet<NodeId>,
    ) -> Option<Path<'g>> {
        let first = source.follow(edge);

        // Breadth-first from the edge target back to the source
        let mut parents: HashMap<NodeId, PathStep<'g>> = HashMap::new();
        let mut queue = VecDeque::from([first]);
        let mut seen = HashSet::from([first.id()]);
        let mut closing = None;
        'search: while let Some(current) = queue.pop_front() {
            for next_edge in current.edges() {
                let next = current.follow(next_edge);
                if next == source {
                    closing = Some((current, next_edge));
                    break 'search;
                }
                if members.contains(&next.id()) && seen.insert(next.id()) {
                    parents.insert(
                        next.id(),
                        PathStep {
                            node: current,
                            via: Some(next_edge),
                        },
                    );
                    queue.push_back(next);
                }
            }
        }

        // Self-loop: the edge itself closes the cycle
        let (mut cursor, closing_edge) = if first == source {
            (source, edge)
        } else {
            closing?
        };

        let mut reversed = vec![PathStep {
            node: source,
            via: Some(closing_edge),
        }];
        while cursor != source {
            match parents.get(&cursor.id()) {
                Some(parent) => {
                    reversed.push(PathStep {
                        node: cursor,
                        via: parent.via,
                    });
                    cursor = parent.node;
                }
                None => {
                    reversed.push(PathStep {
                        node: cursor,
                        via: Some(edge),
                    });
                    cursor = source;
                }
            }
        }
        reversed.push(PathStep {
            node: source,
            via: None,
        });
        reversed.reverse();

        Some(Path {
            steps: reversed,
            cycle_start: 0,
        })
    }
}
