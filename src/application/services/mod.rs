//! Application services

pub mod codec;

pub use codec::{CodecParams, CodecService, DocumentStats, MAX_DOCUMENT_DEPTH, MAX_RENDER_DEPTH};
