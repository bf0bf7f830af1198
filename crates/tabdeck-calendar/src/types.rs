//! Calendar API types and data structures.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Calendar metadata as shown in the picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: String,
    pub summary: String,
    pub is_primary: bool,
}

// API Response Types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListResponse {
    #[serde(default)]
    pub items: Vec<ApiCalendar>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCalendar {
    pub id: String,
    pub summary: Option<String>,
    pub summary_override: Option<String>,
    #[serde(default)]
    pub primary: bool,
}

impl From<ApiCalendar> for Calendar {
    fn from(api: ApiCalendar) -> Self {
        Self {
            id: api.id,
            summary: api
                .summary_override
                .or(api.summary)
                .unwrap_or_default(),
            is_primary: api.primary,
        }
    }
}

/// Picker order: the primary calendar first, then by summary, ignoring case.
pub fn picker_order(a: &Calendar, b: &Calendar) -> Ordering {
    b.is_primary
        .cmp(&a.is_primary)
        .then_with(|| a.summary.to_lowercase().cmp(&b.summary.to_lowercase()))
}

pub fn sort_for_picker(calendars: &mut [Calendar]) {
    calendars.sort_by(picker_order);
}
