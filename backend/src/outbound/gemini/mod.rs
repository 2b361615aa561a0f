//! Gemini `generateContent` adapter for the completion port.

mod dto;
mod http_source;

pub use http_source::GeminiHttpSource;
