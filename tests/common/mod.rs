//! Shared helpers for the integration suites.
#![allow(dead_code)]

use std::sync::Once;

use verdict::host::{self, HostConfig, Outcome, TestHandle};

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber once; `RUST_LOG=verdict=debug` shows the events.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Runs `body` as a top-level test with colours, filtering and printing disabled.
pub fn quiet(name: &str, body: impl FnOnce(&dyn TestHandle)) -> Outcome {
    init_tracing();
    host::run_with(&HostConfig::plain(), name, body)
}

/// The single failure recorded anywhere in `outcome`.
pub fn only_failure(outcome: &Outcome) -> String {
    let failures = outcome.all_failures();
    assert_eq!(failures.len(), 1, "expected one failure, got {failures:#?}");
    failures[0].to_string()
}
