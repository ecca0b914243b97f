//! Wire messages. Every message is one JSON object followed by `\n`.
//!
//! ```text
//! client: {"idx": n, "state": {"mode": .., "dim": .., "ct": .., "gm": .., "hue": .., "sat": ..}}
//! server: {"response":"ok"}
//!         {"response":"state","state":[{...}, ...]}
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::FrameError;
use crate::light::{LightState, StatePatch};

/// Update request for a single light.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub idx: i64,
    pub state: StatePatch,
}

impl Command {
    /// Decode one frame (without its trailing newline).
    ///
    /// Bytes that are not JSON at all are a `Parse` error; JSON that does not
    /// have the command shape is a `MalformedCommand`.
    pub fn from_frame(frame: &[u8]) -> Result<Self, FrameError> {
        let value: serde_json::Value = serde_json::from_slice(frame).map_err(FrameError::Parse)?;
        serde_json::from_value(value).map_err(|e| FrameError::MalformedCommand(e.to_string()))
    }
}

/// Server to client message, tagged by the `response` key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "response", rename_all = "lowercase")]
pub enum Response {
    Ok,
    State { state: Vec<LightState> },
}

impl Response {
    pub fn state(state: Vec<LightState>) -> Self {
        Self::State { state }
    }
}
