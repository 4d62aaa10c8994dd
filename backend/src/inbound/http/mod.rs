//! HTTP inbound adapter exposing REST endpoints.

pub mod contacts;
pub mod dispatch;
pub mod schemas;
pub mod state;

pub use dispatch::{PipelineRequest, dispatch, render, route_not_found};
pub use state::{HttpState, HttpStatePorts};
