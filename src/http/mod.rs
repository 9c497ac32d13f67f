pub mod client;

pub use client::{EngineTransport, TransportSettings};
