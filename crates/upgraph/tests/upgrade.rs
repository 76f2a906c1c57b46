//! Runner tests against a composite store with a registered connection.

use journal::Journal;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use upgraph::{
    CompositeUpgradeDefinitionFactory, ContextRef, ExecutionState, FactoryRef, Graph,
    GraphUpgradeDefinitionFactory, LeafTask, RecordingListener, Registration,
    SimpleUpgradeContext, TaskRef, UpgradeConfig, UpgradeContext, UpgradeContextExt,
    UpgradeError, Upgrader, Version,
};

mod journal {
    use parking_lot::Mutex;

    /// Stand-in for a database connection: records the statements it runs.
    #[derive(Default)]
    pub struct Journal {
        statements: Mutex<Vec<String>>,
    }

    impl Journal {
        pub fn run(&self, statement: &str) {
            self.statements.lock().push(statement.to_string());
        }

        pub fn statements(&self) -> Vec<String> {
            self.statements.lock().clone()
        }
    }
}

fn statement_edge(statement: &'static str) -> impl Fn(&ContextRef) -> TaskRef + Send + Sync {
    move |ctx: &ContextRef| {
        let ctx = ctx.clone();
        Arc::new(LeafTask::new(statement, 1, move |ticks| {
            let journal = ctx.persistence::<Journal>()?;
            ctx.logger_for::<Journal>().info(statement);
            journal.run(statement);
            ticks.increment();
            Ok(())
        })) as TaskRef
    }
}

fn subsystem(statements: [&'static str; 2]) -> FactoryRef {
    let graph = Graph::builder()
        .edge(Version::initial(), Version::scalar(0, 1, 0), statement_edge(statements[0]))
        .edge(Version::scalar(0, 1, 0), Version::scalar(0, 2, 0), statement_edge(statements[1]))
        .build()
        .unwrap();
    Arc::new(GraphUpgradeDefinitionFactory::new(graph))
}

fn store() -> (Arc<Journal>, ContextRef) {
    let journal = Arc::new(Journal::default());
    let ctx = SimpleUpgradeContext::initial().with_persistence(Registration::shared(journal.clone()));
    (journal, Arc::new(ctx))
}

#[test]
fn composite_upgrade_runs_every_statement_in_order() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let factory = CompositeUpgradeDefinitionFactory::unordered(vec![
        ("core", subsystem(["create users", "add email"])),
        ("search", subsystem(["create index", "rebuild index"])),
    ]);
    let recorder = RecordingListener::new();
    let upgrader = Upgrader::new(Arc::new(factory) as FactoryRef, UpgradeConfig::strict())
        .with_listener(recorder.clone());
    let (journal, ctx) = store();

    let outcome = upgrader.run(&ctx).unwrap();
    assert!(outcome.is_up_to_date());
    assert_eq!(outcome.planned, 2);
    assert_eq!(
        ctx.version().unwrap().to_string(),
        r#"{"core": "0.2.0", "search": "0.2.0"}"#
    );
    assert_eq!(
        journal.statements(),
        vec!["create users", "add email", "create index", "rebuild index"]
    );
    assert_eq!(recorder.states(), vec![ExecutionState::Running, ExecutionState::Completed]);

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["to"], r#"{"core": "0.2.0", "search": "0.2.0"}"#);
    assert_eq!(json["report"]["state"], "COMPLETED");
}

#[test]
fn resumes_from_partially_upgraded_store() {
    let factory = CompositeUpgradeDefinitionFactory::ordered(vec![
        subsystem(["a1", "a2"]),
        subsystem(["b1", "b2"]),
    ]);
    let upgrader = Upgrader::new(Arc::new(factory) as FactoryRef, UpgradeConfig::default());
    let (journal, ctx) = store();
    ctx.set_version(Version::lookup(r#"["0.2.0", "0.1.0"]"#).unwrap())
        .unwrap();

    let outcome = upgrader.run(&ctx).unwrap();
    assert_eq!(journal.statements(), vec!["b2"]);
    assert_eq!(outcome.to, Version::lookup(r#"["0.2.0", "0.2.0"]"#).unwrap());
}

#[test]
fn missing_connection_fails_the_run() {
    let upgrader = Upgrader::new(subsystem(["x", "y"]), UpgradeConfig::default());
    let ctx: ContextRef = Arc::new(SimpleUpgradeContext::initial());

    let err = upgrader.run(&ctx).unwrap_err();
    assert!(matches!(err, UpgradeError::PersistenceContextNotFound { .. }));
    // The first step recorded its transition marker before failing.
    assert!(ctx.version().unwrap().is_transition());
}
