//! Backend gateway for the railqa client.
//!
//! A stateless JSON-over-HTTP interface to the question-answering,
//! diagram-generation and liveness routes of the backend. State machines
//! depend on the `Gateway` trait; `HttpGateway` is the reqwest-backed
//! implementation and `ScriptedGateway` a programmable stand-in.

pub mod client;
pub mod error;
pub mod mock;
pub mod types;

pub use client::{call_with_timeout, Gateway, HttpGateway};
pub use error::{FailureKind, GatewayError};
pub use mock::ScriptedGateway;
pub use types::{AnswerResponse, GenerationResponse, Probe};
