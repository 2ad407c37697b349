// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session and upstream API layer.

pub mod auth;
pub mod whoop;

pub use auth::TokenManager;
pub use whoop::WhoopClient;
