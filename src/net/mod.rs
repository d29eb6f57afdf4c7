//! Network access to the peer.

pub mod client;
pub mod config;
pub mod mock;

pub use client::{HttpTransport, Transport};
pub use config::ClientConfig;
