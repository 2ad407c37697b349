// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod endpoint;
pub mod personal_info;
pub mod tokens;

pub use endpoint::{DateRange, Endpoint, EndpointDescriptor};
pub use personal_info::{BasicProfile, BodyMeasurement, PersonalInfo};
pub use tokens::{Credentials, TokenRefreshResponse, TokenState};
