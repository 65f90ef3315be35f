//! Test doubles and common utilities for contract tests
//!
//! The doubles script the active region and count every resolution and
//! client construction so tests can assert exact call counts.

#![allow(dead_code)]

use regionwatch_core::error::{Error, Result};
use regionwatch_core::traits::{ClientFactory, RegionResolver};
use regionwatch_core::ActiveRegion;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted resolver answer
#[derive(Debug, Clone)]
pub enum Answer {
    Region(&'static str),
    Fail(&'static str),
}

/// A resolver replaying a script of answers
///
/// Once the script is exhausted the last answer repeats.
pub struct ScriptedResolver {
    script: Arc<Mutex<VecDeque<Answer>>>,
    last: Arc<Mutex<Option<Answer>>>,
    resolve_call_count: Arc<AtomicUsize>,
}

impl ScriptedResolver {
    pub fn new(script: Vec<Answer>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            last: Arc::new(Mutex::new(None)),
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Resolver that always reports `region`
    pub fn fixed(region: &'static str) -> Self {
        Self::new(vec![Answer::Region(region)])
    }

    /// Create a resolver that shares script and counters with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            last: Arc::clone(&other.last),
            resolve_call_count: Arc::clone(&other.resolve_call_count),
        }
    }

    /// Append answers to the script
    pub fn push(&self, answer: Answer) {
        self.script.lock().unwrap().push_back(answer);
    }

    /// Get the number of times resolve() was called
    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RegionResolver for ScriptedResolver {
    async fn resolve(&self) -> Result<ActiveRegion> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        let answer = match next {
            Some(answer) => {
                *self.last.lock().unwrap() = Some(answer.clone());
                answer
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or(Answer::Fail("empty script")),
        };

        match answer {
            Answer::Region(region) => Ok(ActiveRegion::new(region)),
            Answer::Fail(message) => Err(Error::resolution(message)),
        }
    }

    fn resolver_name(&self) -> &'static str {
        "scripted"
    }
}

/// Client handed out by [`CountingClientFactory`]
#[derive(Debug)]
pub struct TestClient {
    pub region: ActiveRegion,
    pub serial: usize,
}

/// A client factory that counts constructions
pub struct CountingClientFactory {
    connect_call_count: Arc<AtomicUsize>,
    connected_regions: Arc<Mutex<Vec<ActiveRegion>>>,
}

impl CountingClientFactory {
    pub fn new() -> Self {
        Self {
            connect_call_count: Arc::new(AtomicUsize::new(0)),
            connected_regions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a factory that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            connect_call_count: Arc::clone(&other.connect_call_count),
            connected_regions: Arc::clone(&other.connected_regions),
        }
    }

    /// Get the number of times connect() was called
    pub fn connect_call_count(&self) -> usize {
        self.connect_call_count.load(Ordering::SeqCst)
    }

    /// Regions clients were built for, in order
    pub fn connected_regions(&self) -> Vec<String> {
        self.connected_regions
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.to_string())
            .collect()
    }
}

#[async_trait::async_trait]
impl ClientFactory for CountingClientFactory {
    type Client = TestClient;

    async fn connect(&self, region: &ActiveRegion) -> Result<TestClient> {
        let serial = self.connect_call_count.fetch_add(1, Ordering::SeqCst);
        self.connected_regions.lock().unwrap().push(region.clone());

        Ok(TestClient {
            region: region.clone(),
            serial,
        })
    }
}

/// A client factory that always fails
pub struct FailingClientFactory;

#[async_trait::async_trait]
impl ClientFactory for FailingClientFactory {
    type Client = TestClient;

    async fn connect(&self, region: &ActiveRegion) -> Result<TestClient> {
        Err(Error::client_construction(region, "credentials rejected"))
    }
}
