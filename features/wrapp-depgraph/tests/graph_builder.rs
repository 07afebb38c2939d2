//! Graph construction: deduplication, binding resolution, lazy expansion and
//! unresolved dependencies.

use petgraph::algo::toposort;

use wrapp_depgraph::{
    Bindings, ComponentIdentity, CyclicDependencyValidator, DeclarationRegistry,
    DependencyDeclaration, DependencyGraphBuilder, DependencyGraphError, DependencyInfo,
    GraphConfig, NoBindings, ResolutionUrgency,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn id(name: &'static str) -> ComponentIdentity {
    ComponentIdentity::named(name)
}

fn declare(name: &'static str) -> DependencyDeclaration {
    DependencyDeclaration::new(id(name))
}

fn child_names(graph: &wrapp_depgraph::Graph, name: &'static str) -> Vec<String> {
    graph
        .node(&id(name))
        .unwrap()
        .children()
        .map(|child| child.identity().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Nodes and roots
// ---------------------------------------------------------------------------

#[test]
fn duplicate_references_collapse_into_one_node() {
    let registry = DeclarationRegistry::new();
    let graph = DependencyGraphBuilder::new(&registry, &NoBindings)
        .build([
            declare("A").immediate(id("C")),
            declare("B").delayed(id("C")).immediate(id("D")),
            declare("C").immediate(id("D")),
            declare("D"),
            declare("D"),
        ])
        .unwrap();

    assert_eq!(graph.len(), 4);
    assert_eq!(graph.node(&id("C")).unwrap().incoming_count(), 2);
    assert_eq!(graph.node(&id("D")).unwrap().incoming_count(), 2);
}

#[test]
fn roots_are_nodes_without_incoming_edges() {
    let registry = DeclarationRegistry::new();
    let graph = DependencyGraphBuilder::new(&registry, &NoBindings)
        .build([
            declare("App").immediate(id("Service")),
            declare("Worker").delayed(id("Service")),
            declare("Service").immediate(id("Database")),
            declare("Database"),
        ])
        .unwrap();

    let mut roots: Vec<String> = graph.roots().iter().map(ToString::to_string).collect();
    roots.sort();
    assert_eq!(roots, ["App", "Worker"]);
}

#[test]
fn acyclic_graph_has_a_topological_order() {
    let registry = DeclarationRegistry::new();
    let graph = DependencyGraphBuilder::new(&registry, &NoBindings)
        .build([
            declare("A").immediate(id("B")).immediate(id("C")),
            declare("B").immediate(id("D")),
            declare("C").delayed(id("D")),
            declare("D"),
        ])
        .unwrap();

    assert!(!graph.roots().is_empty());
    let exported = graph.to_petgraph();
    let order = toposort(&exported, None).unwrap();
    assert_eq!(order.len(), graph.len());
    assert_eq!(exported[order[0]], id("A"));
}

#[test]
fn children_keep_declaration_order() {
    let registry = DeclarationRegistry::new();
    let graph = DependencyGraphBuilder::new(&registry, &NoBindings)
        .build([
            declare("A")
                .delayed(id("D"))
                .immediate(id("B"))
                .immediate(id("C")),
            declare("B"),
            declare("C"),
            declare("D"),
        ])
        .unwrap();

    assert_eq!(child_names(&graph, "A"), ["D", "B", "C"]);
}

// ---------------------------------------------------------------------------
// Bindings
// ---------------------------------------------------------------------------

#[test]
fn interface_dependency_resolves_to_the_same_children_as_a_direct_one() {
    let registry = DeclarationRegistry::new();
    let direct = DependencyGraphBuilder::new(&registry, &NoBindings)
        .build([declare("Service").immediate(id("SmtpMailer")), declare("SmtpMailer")])
        .unwrap();

    let mut bindings = Bindings::new();
    bindings.bind(id("Mailer"), id("SmtpMailer")).unwrap();
    let bound = DependencyGraphBuilder::new(&registry, &bindings)
        .build([declare("Service").immediate(id("Mailer")), declare("SmtpMailer")])
        .unwrap();

    assert_eq!(child_names(&direct, "Service"), child_names(&bound, "Service"));

    let edge = &bound.node(&id("Service")).unwrap().edges()[0];
    assert_eq!(edge.declared(), &id("Mailer"));
    assert!(!bound.contains(&id("Mailer")));
}

#[test]
fn interface_declaration_depends_on_its_implementation() {
    let mut registry = DeclarationRegistry::new();
    registry.register(declare("SmtpMailer")).unwrap();
    let mut bindings = Bindings::new();
    bindings.bind(id("Mailer"), id("SmtpMailer")).unwrap();

    let graph = DependencyGraphBuilder::new(&registry, &bindings)
        .build([declare("Mailer")])
        .unwrap();

    assert_eq!(graph.len(), 2);
    assert_eq!(child_names(&graph, "Mailer"), ["SmtpMailer"]);
    let edge = &graph.node(&id("Mailer")).unwrap().edges()[0];
    assert_eq!(edge.urgency(), ResolutionUrgency::Immediate);
    assert_eq!(graph.roots().len(), 1);
}

#[test]
fn chained_binding_points_at_the_concrete_component() {
    let registry = DeclarationRegistry::new();
    let mut bindings = Bindings::new();
    bindings
        .bind(id("Api"), id("IMailer"))
        .unwrap()
        .bind(id("IMailer"), id("SmtpMailer"))
        .unwrap();

    let graph = DependencyGraphBuilder::new(&registry, &bindings)
        .build([declare("IMailer"), declare("SmtpMailer").delayed(id("Api"))])
        .unwrap();

    assert_eq!(graph.len(), 2);
    assert_eq!(child_names(&graph, "IMailer"), ["SmtpMailer"]);
    assert_eq!(child_names(&graph, "SmtpMailer"), ["SmtpMailer"]);

    let edge = &graph.node(&id("SmtpMailer")).unwrap().edges()[0];
    assert_eq!(edge.declared(), &id("Api"));
    assert_eq!(edge.urgency(), ResolutionUrgency::Delayed);

    // The only declared edge of the cycle is delayed
    assert!(CyclicDependencyValidator::new(&graph).check().is_ok());
}

// ---------------------------------------------------------------------------
// Lazy expansion and missing dependencies
// ---------------------------------------------------------------------------

#[test]
fn undeclared_dependencies_are_expanded_from_the_provider() {
    let mut registry = DeclarationRegistry::new();
    registry
        .register(declare("Service").immediate(id("Repository")))
        .unwrap()
        .register(declare("Repository").immediate(id("Database")))
        .unwrap()
        .register(declare("Database"))
        .unwrap()
        .register(declare("Unrelated"))
        .unwrap();

    let graph = DependencyGraphBuilder::new(&registry, &NoBindings)
        .build_from([id("Service")])
        .unwrap();

    assert_eq!(graph.len(), 3);
    assert!(graph.contains(&id("Database")));
    assert!(!graph.contains(&id("Unrelated")));
}

#[test]
fn unknown_starting_component_is_reported_on_its_own() {
    let mut registry = DeclarationRegistry::new();
    registry.register(declare("Service")).unwrap();

    let errors = DependencyGraphBuilder::new(&registry, &NoBindings)
        .build_from([id("Service"), id("Ghost")])
        .unwrap_err();

    assert!(matches!(
        errors.errors.as_slice(),
        [DependencyGraphError::UnknownComponent(identity)] if identity == &id("Ghost")
    ));
    assert_eq!(errors.missing().count(), 0);
    assert!(errors.to_string().contains("No declaration is known for 'Ghost'"));
}

#[test]
fn missing_dependency_names_both_sides() {
    let registry = DeclarationRegistry::new();
    let errors = DependencyGraphBuilder::new(&registry, &NoBindings)
        .build([declare("A").immediate(id("B")), declare("C").delayed(id("D"))])
        .unwrap_err();

    let missing: Vec<_> = errors
        .missing()
        .map(|(dependency, required_by)| (dependency.to_string(), required_by.to_string()))
        .collect();
    assert_eq!(
        missing,
        [
            ("B".to_string(), "A".to_string()),
            ("D".to_string(), "C".to_string())
        ]
    );
    assert!(errors.to_string().contains("'A' needs 'B' but it is missing"));
}

#[test]
fn missing_implementation_is_reported_by_its_concrete_identity() {
    let registry = DeclarationRegistry::new();
    let mut bindings = Bindings::new();
    bindings.bind(id("Mailer"), id("SmtpMailer")).unwrap();

    let errors = DependencyGraphBuilder::new(&registry, &bindings)
        .build([declare("Service").immediate(id("Mailer"))])
        .unwrap_err();

    let (dependency, required_by) = errors.missing().next().unwrap();
    assert_eq!(dependency, &id("SmtpMailer"));
    assert_eq!(required_by, &id("Service"));
}

#[test]
fn missing_optional_dependency_is_skipped() {
    let registry = DeclarationRegistry::new();
    let graph = DependencyGraphBuilder::new(&registry, &NoBindings)
        .build([declare("A").with(DependencyInfo::delayed(id("Metrics")).optional())])
        .unwrap();

    assert_eq!(graph.len(), 1);
    assert!(graph.node(&id("A")).unwrap().edges().is_empty());
}

#[test]
fn expansion_can_be_disabled() {
    let mut registry = DeclarationRegistry::new();
    registry.register(declare("B")).unwrap();

    let errors = DependencyGraphBuilder::new(&registry, &NoBindings)
        .with_config(GraphConfig::default().with_expand_missing(false))
        .build([declare("A").immediate(id("B"))])
        .unwrap_err();

    assert_eq!(errors.missing().count(), 1);
}

#[test]
fn conflicting_declarations_are_rejected() {
    let registry = DeclarationRegistry::new();
    let errors = DependencyGraphBuilder::new(&registry, &NoBindings)
        .build([declare("A").immediate(id("B")), declare("A"), declare("B")])
        .unwrap_err();

    assert!(matches!(
        errors.errors.as_slice(),
        [DependencyGraphError::Duplicate(identity)] if identity == &id("A")
    ));
}

#[test]
fn same_dependencies_in_another_order_collapse_into_one_node() {
    let registry = DeclarationRegistry::new();
    let graph = DependencyGraphBuilder::new(&registry, &NoBindings)
        .build([
            declare("A").immediate(id("B")).immediate(id("C")),
            declare("A").immediate(id("C")).immediate(id("B")),
            declare("A").immediate(id("B")).immediate(id("C")).immediate(id("B")),
            declare("B"),
            declare("C"),
        ])
        .unwrap();

    assert_eq!(graph.len(), 3);
    assert_eq!(child_names(&graph, "A"), ["B", "C"]);
}

#[test]
fn dot_export_names_every_component() {
    let registry = DeclarationRegistry::new();
    let graph = DependencyGraphBuilder::new(&registry, &NoBindings)
        .build([declare("A").immediate(id("B")), declare("B").delayed(id("A"))])
        .unwrap();

    let dot = graph.to_dot();
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("\"A\""));
    assert!(dot.contains("\"B\""));
    assert!(dot.contains("delayed"));
}
