//! Cucumber runner for the account and bookstore features.
//!
//! Targets an in-process `bookstore-stub` unless built with `--features live-api`,
//! in which case requests go to the configured base URL.

mod steps;
mod world;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bookstore_bdd::{logging, Config, Outcome, RunLog, ScenarioEnd, Session};
use bookstore_stub::StubServer;
use cucumber::{event::ScenarioFinished, World as _};
use futures::{future, FutureExt};
use world::{session_for, BookstoreWorld, RUN_CONFIG};

/// What lives for the whole run: the log and the session every scenario resumes.
#[derive(Debug)]
struct Run {
    log: RunLog,
    session: Session,
}

/// Ends the run log and stops the stub even when cucumber exits by panicking.
struct TestRun {
    run: Arc<Mutex<Run>>,
    _stub: Option<StubServer>,
}

impl Drop for TestRun {
    fn drop(&mut self) {
        lock(&self.run).log.finish();
    }
}

fn lock(run: &Mutex<Run>) -> MutexGuard<'_, Run> {
    run.lock().unwrap_or_else(PoisonError::into_inner)
}

fn main() {
    let mut config = Config::load().expect("load configuration");

    let stub = if cfg!(feature = "live-api") {
        None
    } else {
        let stub = StubServer::start().expect("start bookstore stub");
        config.base_url = stub.url();
        config.settle_delay_ms = 0;
        Some(stub)
    };

    logging::init(&config).expect("initialise logging");
    tracing::info!(base_url = %config.base_url, "target API");

    let run = Arc::new(Mutex::new(Run {
        log: RunLog::new(),
        session: session_for(&config),
    }));
    RUN_CONFIG
        .set(config)
        .expect("run configuration is only set once");
    lock(&run).log.start();
    let guard = TestRun {
        run: Arc::clone(&run),
        _stub: stub,
    };

    let before_run = Arc::clone(&run);
    let after_run = Arc::clone(&run);

    futures::executor::block_on(
        BookstoreWorld::cucumber()
            .max_concurrent_scenarios(1)
            .fail_on_skipped()
            .before(move |feature, _rule, scenario, world| {
                {
                    let mut run = lock(&before_run);
                    run.log.enter_feature(&feature.name);
                    world.session.resume(&run.session);
                }
                world.session.before_scenario(&scenario.name);
                future::ready(()).boxed_local()
            })
            .after(move |feature, rule, scenario, finished, world| {
                let outcome = match finished {
                    ScenarioFinished::StepPassed => Outcome::Passed,
                    ScenarioFinished::StepSkipped => Outcome::Skipped,
                    _ => Outcome::Failed,
                };
                let mut run = lock(&after_run);
                if let Some(world) = world {
                    let tags: Vec<String> = feature
                        .tags
                        .iter()
                        .chain(rule.into_iter().flat_map(|r| r.tags.iter()))
                        .chain(scenario.tags.iter())
                        .cloned()
                        .collect();
                    world.session.after_scenario(&ScenarioEnd {
                        name: &scenario.name,
                        tags: &tags,
                        outcome,
                    });
                    run.session.clone_from(&world.session);
                }
                run.log.record(outcome);
                future::ready(()).boxed_local()
            })
            .run_and_exit("tests/features"),
    );

    drop(guard);
}
