//! Programmable gateway for headless runs and tests.
//!
//! Responses are scripted per route. Calls can be held at a gate to observe
//! in-flight state, delayed per probe, or made to hang forever.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::client::Gateway;
use crate::error::GatewayError;
use crate::types::{AnswerResponse, GenerationResponse, Probe};

/// A call the gateway received, recorded before any gate or delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Ask(String),
    Generate(String),
    Probe(Probe),
}

/// Gateway whose responses are set by the caller.
///
/// Defaults: every probe succeeds, the question and generation routes
/// fail with a transport error until scripted.
pub struct ScriptedGateway {
    answer: Mutex<Result<AnswerResponse, GatewayError>>,
    generation: Mutex<Result<GenerationResponse, GatewayError>>,
    probes: Mutex<HashMap<Probe, Result<(), GatewayError>>>,
    probe_delays: Mutex<HashMap<Probe, Duration>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    hang: AtomicBool,
    calls: Mutex<Vec<GatewayCall>>,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGateway {
    pub fn new() -> Self {
        let unscripted = || GatewayError::Transport("no response scripted".to_string());
        Self {
            answer: Mutex::new(Err(unscripted())),
            generation: Mutex::new(Err(unscripted())),
            probes: Mutex::new(HashMap::new()),
            probe_delays: Mutex::new(HashMap::new()),
            gate: Mutex::new(None),
            hang: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn answer_with(&self, answer: &str, context: Option<&str>) {
        self.set_answer(Ok(AnswerResponse {
            answer: answer.to_string(),
            context: context.map(str::to_string),
            sources: None,
        }));
    }

    pub fn set_answer(&self, result: Result<AnswerResponse, GatewayError>) {
        *self.answer.lock().expect("answer mutex poisoned") = result;
    }

    pub fn generate_with(&self, script: &str) {
        self.set_generation(Ok(GenerationResponse {
            mermaid_script: script.to_string(),
        }));
    }

    pub fn set_generation(&self, result: Result<GenerationResponse, GatewayError>) {
        *self.generation.lock().expect("generation mutex poisoned") = result;
    }

    pub fn set_probe(&self, probe: Probe, result: Result<(), GatewayError>) {
        self.probes
            .lock()
            .expect("probes mutex poisoned")
            .insert(probe, result);
    }

    /// Make one probe take `delay` before it answers.
    pub fn delay_probe(&self, probe: Probe, delay: Duration) {
        self.probe_delays
            .lock()
            .expect("probe delays mutex poisoned")
            .insert(probe, delay);
    }

    /// Hold every subsequent call until `release` lets it through.
    pub fn hold(&self) {
        *self.gate.lock().expect("gate mutex poisoned") = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `n` held calls proceed.
    pub fn release(&self, n: usize) {
        if let Some(gate) = self.gate.lock().expect("gate mutex poisoned").as_ref() {
            gate.add_permits(n);
        }
    }

    /// Never answer any subsequent call.
    pub fn hang(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }

    async fn wait_turn(&self) {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let gate = self.gate.lock().expect("gate mutex poisoned").clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn ask(&self, question: &str) -> Result<AnswerResponse, GatewayError> {
        self.record(GatewayCall::Ask(question.to_string()));
        self.wait_turn().await;
        self.answer.lock().expect("answer mutex poisoned").clone()
    }

    async fn generate(&self, description: &str) -> Result<GenerationResponse, GatewayError> {
        self.record(GatewayCall::Generate(description.to_string()));
        self.wait_turn().await;
        self.generation
            .lock()
            .expect("generation mutex poisoned")
            .clone()
    }

    async fn probe(&self, probe: Probe) -> Result<(), GatewayError> {
        self.record(GatewayCall::Probe(probe));
        let delay = self
            .probe_delays
            .lock()
            .expect("probe delays mutex poisoned")
            .get(&probe)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.wait_turn().await;
        self.probes
            .lock()
            .expect("probes mutex poisoned")
            .get(&probe)
            .cloned()
            .unwrap_or(Ok(()))
    }
}
