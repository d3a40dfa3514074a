//! UI theme preference.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Colour theme stored on the user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "ui_theme", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    #[default]
    Light,
    /// Dark theme.
    Dark,
}

impl FromStr for Theme {
    type Err = busway_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(busway_core::AppError::validation(
                "Invalid theme. Must be light or dark",
            )),
        }
    }
}
