// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MCP surface: wire types, capability registry, stdio server.

pub mod protocol;
pub mod registry;
pub mod server;

pub use registry::{Capability, EndpointRegistry};
pub use server::McpServer;
