use std::error::Error;

use tracing_subscriber::EnvFilter;
use wrapp_depgraph::{
    Bindings, Component, ComponentIdentity, CyclicDependencyValidator, DeclarationRegistry,
    DependencyGraphBuilder, DependencyInfo,
};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let mut registry = DeclarationRegistry::new();
    registry
        .register_component::<Database>()?
        .register_component::<UserRepository>()?
        .register_component::<SmtpMailer>()?
        .register_component::<UserService>()?;

    let mut bindings = Bindings::new();
    bindings.bind_type::<dyn Mailer, SmtpMailer>()?;

    // Only the service is declared up front, the rest is pulled from the registry
    let builder = DependencyGraphBuilder::new(&registry, &bindings);
    let graph = builder.build([UserService::declaration()])?;

    println!("{}", graph.to_dot());

    let validator = CyclicDependencyValidator::new(&graph);
    for node in graph.nodes() {
        let cycle = validator.discovery_list(&validator.walk(node));
        if !cycle.is_empty() {
            println!("Fatal: {}", cycle);
        }
    }

    match validator.check() {
        Ok(()) => println!("No fatal circular dependencies"),
        Err(errors) => println!("{}", errors),
    }
    Ok(())
}

struct Database;
impl Component for Database {
    fn dependencies() -> Vec<DependencyInfo> {
        vec![]
    }
}

struct UserRepository;
impl Component for UserRepository {
    fn dependencies() -> Vec<DependencyInfo> {
        vec![
            DependencyInfo::immediate(ComponentIdentity::of::<Database>()),
            DependencyInfo::delayed(ComponentIdentity::of::<UserService>()),
        ]
    }
}

trait Mailer {}

struct SmtpMailer;
impl Mailer for SmtpMailer {}
impl Component for SmtpMailer {
    fn dependencies() -> Vec<DependencyInfo> {
        vec![DependencyInfo::delayed(ComponentIdentity::of::<UserService>()).optional()]
    }
}

struct UserService;
impl Component for UserService {
    fn dependencies() -> Vec<DependencyInfo> {
        vec![
            DependencyInfo::immediate(ComponentIdentity::of::<UserRepository>()),
            DependencyInfo::delayed(ComponentIdentity::of::<dyn Mailer>()),
        ]
    }
}
