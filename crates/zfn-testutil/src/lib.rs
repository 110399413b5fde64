//! Test utilities for zfn.
//!
//! - [`schemas`]: minimal schema stand-ins, one per edge of the schema contract
//! - [`SpyRecorder`]: a spy that remembers every call it observed
//! - [`CallCounter`]: counts how often an implementation actually ran
//! - [`init_tracing`]: route zfn's logs to the test harness

pub mod schemas;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use zfn::Value;

/// Install a test-friendly tracing subscriber, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init();
}

/// One observation made by a spy.
#[derive(Debug, Clone, PartialEq)]
pub struct SpyCall {
    pub args: Vec<Value>,
    pub result: Value,
    pub count: u64,
}

/// Records spy observations in order.
#[derive(Debug, Clone, Default)]
pub struct SpyRecorder {
    calls: Arc<Mutex<Vec<SpyCall>>>,
}

impl SpyRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A spy closure that records into this recorder.
    pub fn handler(&self) -> impl Fn(Vec<Value>, Value, u64) -> anyhow::Result<()> + Send + Sync + 'static {
        let calls = self.calls.clone();
        move |args, result, count| {
            calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(SpyCall { args, result, count });
            Ok(())
        }
    }

    pub fn calls(&self) -> Vec<SpyCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The counter value passed with each observation.
    pub fn counts(&self) -> Vec<u64> {
        self.calls().into_iter().map(|call| call.count).collect()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared invocation counter.
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    count: Arc<AtomicUsize>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}
