//! Outbound adapters implementing the domain ports.

pub mod gemini;
pub mod persistence;
