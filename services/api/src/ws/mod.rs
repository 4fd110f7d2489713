//! WebSocket surface: the stand-in for the external real-time voice
//! platform. Transcribed utterances come in, reply strings go out.

pub mod protocol;
pub mod session;

pub use session::ws_handler;
