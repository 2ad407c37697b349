// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Declarative table of the WHOOP endpoints exposed over MCP.
//!
//! Every entry yields a resource (`whoop://{name}`). Entries that take a
//! date range also yield a tool (`get_{name}`).

use crate::time_utils::{default_window, format_utc_rfc3339};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// URI scheme prefix for resources.
pub const RESOURCE_SCHEME: &str = "whoop://";

/// Prefix for date-range tool names.
pub const TOOL_PREFIX: &str = "get_";

/// Upstream endpoint description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub name: &'static str,
    pub path: &'static str,
    pub requires_date_range: bool,
}

/// The WHOOP endpoints this server knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Cycle,
    Recovery,
    Sleep,
    Workout,
    BodyMeasurement,
    Profile,
}

impl Endpoint {
    /// All endpoints, in registration order.
    pub const ALL: [Endpoint; 6] = [
        Endpoint::Cycle,
        Endpoint::Recovery,
        Endpoint::Sleep,
        Endpoint::Workout,
        Endpoint::BodyMeasurement,
        Endpoint::Profile,
    ];

    pub const fn descriptor(self) -> EndpointDescriptor {
        match self {
            Endpoint::Cycle => EndpointDescriptor {
                name: "cycle",
                path: "/v1/cycle",
                requires_date_range: true,
            },
            Endpoint::Recovery => EndpointDescriptor {
                name: "recovery",
                path: "/v1/recovery",
                requires_date_range: true,
            },
            Endpoint::Sleep => EndpointDescriptor {
                name: "sleep",
                path: "/v1/activity/sleep",
                requires_date_range: true,
            },
            Endpoint::Workout => EndpointDescriptor {
                name: "workout",
                path: "/v1/activity/workout",
                requires_date_range: true,
            },
            Endpoint::BodyMeasurement => EndpointDescriptor {
                name: "body_measurement",
                path: "/v1/user/measurement/body",
                requires_date_range: false,
            },
            Endpoint::Profile => EndpointDescriptor {
                name: "profile",
                path: "/v1/user/profile/basic",
                requires_date_range: false,
            },
        }
    }

    pub const fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub const fn path(self) -> &'static str {
        self.descriptor().path
    }

    pub const fn requires_date_range(self) -> bool {
        self.descriptor().requires_date_range
    }

    /// `whoop://{name}`
    pub fn resource_uri(self) -> String {
        format!("{}{}", RESOURCE_SCHEME, self.name())
    }

    /// `get_{name}`, only for date-ranged endpoints.
    pub fn tool_name(self) -> Option<String> {
        self.requires_date_range()
            .then(|| format!("{}{}", TOOL_PREFIX, self.name()))
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    pub fn from_resource_uri(uri: &str) -> Option<Self> {
        uri.strip_prefix(RESOURCE_SCHEME).and_then(Self::from_name)
    }

    pub fn from_tool_name(tool: &str) -> Option<Self> {
        tool.strip_prefix(TOOL_PREFIX)
            .and_then(Self::from_name)
            .filter(|e| e.requires_date_range())
    }
}

/// Inclusive date window passed upstream as `start`/`end`.
///
/// Values are forwarded verbatim; no format validation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// The default seven-day window ending at `now`.
    pub fn last_week(now: DateTime<Utc>) -> Self {
        let (start, end) = default_window(now);
        Self::new(format_utc_rfc3339(start), format_utc_rfc3339(end))
    }

    /// Query parameters in the order they are sent.
    pub fn query(&self) -> [(&'static str, &str); 2] {
        [("start", self.start.as_str()), ("end", self.end.as_str())]
    }
}
