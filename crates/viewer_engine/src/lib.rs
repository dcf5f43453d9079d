//! Viewer engine: backend IO and effect execution.
mod backend;
mod debounce;
mod decode;
mod engine;
mod types;

pub use backend::{Backend, BackendSettings, ReqwestBackend};
pub use debounce::Debouncer;
pub use decode::decode_tree_image;
pub use engine::{ChannelEventSink, EngineConfig, EngineHandle, EventSink};
pub use types::{
    DecodedImage, EngineError, EngineEvent, EntitiesPayload, FailureKind, FetchError, Generation,
    SaveSeq,
};
