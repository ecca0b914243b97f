//! # lightsim-core
//!
//! Shared vocabulary for the light simulator:
//!
//! - **Light records**: `LightState` and the partial `StatePatch` applied to it
//! - **Wire protocol**: `Command` (client to server) and `Response` (server to client)
//! - **State store**: `StateStore`, the one piece of mutable state shared by all sessions
//! - **Device output**: `DeviceOutput`, the radio command real hardware would receive
//! - **Errors**: `FrameError` via `thiserror`
//! - **Session ids**: `SessionId`

#![deny(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod light;
pub mod output;
pub mod protocol;
pub mod store;

pub use errors::FrameError;
pub use ids::SessionId;
pub use light::{LightState, StatePatch};
pub use output::DeviceOutput;
pub use protocol::{Command, Response};
pub use store::{MergeOutcome, StateStore};
