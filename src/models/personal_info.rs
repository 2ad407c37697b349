// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Combined profile and body measurement record.

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Basic profile from `/v1/user/profile/basic`.
#[derive(Debug, Clone, Deserialize)]
pub struct BasicProfile {
    pub user_id: Number,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Body measurements from `/v1/user/measurement/body`.
#[derive(Debug, Clone, Deserialize)]
pub struct BodyMeasurement {
    pub height_meter: Number,
    pub weight_kilogram: Number,
    pub max_heart_rate: Number,
}

/// Flat union of [`BasicProfile`] and [`BodyMeasurement`].
///
/// Numbers keep the representation WHOOP sent (`80` stays `80`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub user_id: Number,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub height_meter: Number,
    pub weight_kilogram: Number,
    pub max_heart_rate: Number,
}

impl PersonalInfo {
    pub fn combine(profile: BasicProfile, body: BodyMeasurement) -> Self {
        Self {
            user_id: profile.user_id,
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            height_meter: body.height_meter,
            weight_kilogram: body.weight_kilogram,
            max_heart_rate: body.max_heart_rate,
        }
    }
}
