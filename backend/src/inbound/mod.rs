//! Inbound adapters that translate external requests into pipeline runs
//! while keeping framework details at the edge.
//!
//! HTTP handlers live under [`http`].

pub mod http;
