//! Test helpers para folio-server.

#![allow(dead_code, unused_imports)]

pub mod assertions;
pub mod client;
pub mod fixtures;

pub use assertions::*;
pub use client::{TestClient, TestResponse, next_sse_chunk};
pub use fixtures::*;
