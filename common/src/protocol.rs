//! Protocol definition for prediction recordings.
//!
//! A recording is a sequence of length-delimited frames, each holding one
//! bincode-encoded [`ProtoMsg`]. The first frame is always a
//! [`ProtoMsg::SessionStart`].
use serde::{Deserialize, Serialize};

/// Definition of protocol messages.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum ProtoMsg {
    SessionStart(SessionStart),
    Tick(TickMsg),
}

/// Header of a recording: which model produced it and its label order.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SessionStart {
    pub model_id: String,
    pub labels: Vec<String>,
}

impl SessionStart {
    pub fn new(model_id: String, labels: Vec<String>) -> Self {
        Self { model_id, labels }
    }
}

/// One inference result, scores in label order.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TickMsg {
    pub time_ms: u64,
    pub scores: Vec<f32>,
}

impl TickMsg {
    pub fn new(time_ms: u64, scores: Vec<f32>) -> Self {
        Self { time_ms, scores }
    }
}

impl ProtoMsg {
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Box<bincode::ErrorKind>> {
        bincode::deserialize(bytes)
    }

    pub fn serialize(&self) -> Result<Vec<u8>, Box<bincode::ErrorKind>> {
        bincode::serialize(self)
    }
}
