//! Shared test utilities
//!
//! `ScriptedTransport` stands in for the backend: replies are queued per
//! endpoint, every call is recorded, and an endpoint can be gated so a test
//! can observe a stage while its request is in flight.

#![allow(dead_code)]

use async_trait::async_trait;
use nsw_common::api::Endpoint;
use nsw_common::events::{EventBus, WorkflowEvent};
use nsw_ui::gateway::{Gateway, Transport, TransportError};
use nsw_ui::orchestrator::{ReviewForm, WorkflowOrchestrator};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::sync::Notify;

/// One canned reply
#[derive(Debug, Clone)]
pub enum Reply {
    Body(Value),
    Raw(String),
    NetworkError(String),
}

/// Recorded request
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: Endpoint,
    pub body: Option<Value>,
}

/// Holds an endpoint's reply until released
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<Endpoint, VecDeque<Reply>>>,
    calls: Mutex<Vec<RecordedCall>>,
    gates: Mutex<HashMap<Endpoint, Arc<Gate>>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a reply; endpoints without queued replies answer `{"status":"success"}`
    pub fn reply(&self, endpoint: Endpoint, reply: Reply) {
        self.replies.lock().unwrap().entry(endpoint).or_default().push_back(reply);
    }

    pub fn reply_json(&self, endpoint: Endpoint, body: Value) {
        self.reply(endpoint, Reply::Body(body));
    }

    pub fn gate(&self, endpoint: Endpoint) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates.lock().unwrap().insert(endpoint, Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.endpoint == endpoint).collect()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.calls().into_iter().map(|c| c.endpoint).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, endpoint: Endpoint, body: Option<Value>) -> Result<Vec<u8>, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall { endpoint, body });

        let gate = self.gates.lock().unwrap().get(&endpoint).cloned();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Reply::Body(json!({"status": "success"})));

        match reply {
            Reply::Body(value) => Ok(serde_json::to_vec(&value).unwrap()),
            Reply::Raw(text) => Ok(text.into_bytes()),
            Reply::NetworkError(description) => Err(TransportError::new(description)),
        }
    }
}

/// Candidate in backend wire shape
pub fn candidate_json(id: i64, kind: &str, selected: bool, user_rating: u8) -> Value {
    json!({
        "id": id,
        "type": kind,
        "text": format!("Candidate text {}", id),
        "relevance": 0.5 + (id as f64) / 100.0,
        "attributes": {"relevance": 0.5, "p_tension": 0.3, "p_sensory": 0.8, "p_reality": 0.1, "p_thought": 0.9},
        "selected": selected,
        "user_rating": user_rating
    })
}

pub fn scene(id: i64) -> Value {
    candidate_json(id, "Scene Craft", false, 0)
}

pub fn character(id: i64) -> Value {
    candidate_json(id, "Character Dynamics", false, 0)
}

pub fn candidates_reply(candidates: Vec<Value>) -> Value {
    json!({"status": "success", "candidates": candidates})
}

pub fn error_reply(message: &str) -> Value {
    json!({"status": "error", "message": message})
}

/// Form that passes generation validation
pub fn ready_form() -> ReviewForm {
    ReviewForm {
        gemini_key: "test-key".to_string(),
        topic_main: "A lighthouse keeper finds a letter".to_string(),
        ..ReviewForm::default()
    }
}

pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub orchestrator: WorkflowOrchestrator,
    pub events: broadcast::Receiver<WorkflowEvent>,
}

pub fn harness_with_form(form: ReviewForm) -> Harness {
    let transport = ScriptedTransport::new();
    let event_bus = EventBus::new(256);
    let events = event_bus.subscribe();
    let gateway = Gateway::new(transport.clone());
    let orchestrator = WorkflowOrchestrator::new(gateway, event_bus, form);
    Harness {
        transport,
        orchestrator,
        events,
    }
}

pub fn harness() -> Harness {
    harness_with_form(ready_form())
}

/// Everything published so far
pub fn drain(events: &mut broadcast::Receiver<WorkflowEvent>) -> Vec<WorkflowEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

/// Reviewer notice texts among `events`
pub fn notices(events: &[WorkflowEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            WorkflowEvent::ReviewerNotice { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}
