pub mod batch;
pub mod translation_ws;

pub use translation_ws::translation_stream;
