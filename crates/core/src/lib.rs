//! Shared domain types for the inference gateway: the error taxonomy, the
//! model registry's value types, and the stream-item wire types that flow
//! between the pipeline and the HTTP/WebSocket surface.

pub mod error;
pub mod model;
pub mod stream;

pub use error::{GatewayError, Result};
pub use model::{
    AudioConstants, ModelKind, ModelRecord, ResolvedModelSet, SamplingDefaults, Status,
    StatusSnapshot,
};
pub use stream::{EncodedItem, OutputFormat, StreamItem};
