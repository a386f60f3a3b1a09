use serde::Deserialize;
use serde_json::Value;

use super::{segment, ApiClient, Method, MessageResponse, Transport};
use crate::error::ApiError;
use crate::models::{SelectionData, SelectionRecord};

/// The shapes `GET /selections/:placementId` has been observed to return.
/// Variants are tried in order; anything else lands in `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SelectionsEnvelope {
    List(Vec<SelectionRecord>),
    Many { selections: Vec<SelectionRecord> },
    One { selection: SelectionRecord },
    Unrecognized(Value),
}

impl SelectionsEnvelope {
    pub fn parse(value: Value) -> Self {
        // The catch-all variant accepts any JSON value.
        serde_json::from_value(value.clone()).unwrap_or(SelectionsEnvelope::Unrecognized(value))
    }
}

/// Flatten any envelope into a list of records. Unknown shapes yield an empty
/// list and a warning.
pub fn normalize_selections(envelope: SelectionsEnvelope) -> Vec<SelectionRecord> {
    match envelope {
        SelectionsEnvelope::List(records) => records,
        SelectionsEnvelope::Many { selections } => selections,
        SelectionsEnvelope::One { selection } => vec![selection],
        SelectionsEnvelope::Unrecognized(payload) => {
            tracing::warn!(%payload, "unexpected response structure for selections list");
            Vec::new()
        }
    }
}

#[derive(Debug, Deserialize)]
struct SelectionEnvelope {
    #[serde(default)]
    selection: Option<SelectionRecord>,
    #[serde(default)]
    updated: Option<SelectionRecord>,
}

impl<T: Transport> ApiClient<T> {
    pub fn list_selections(&self, placement_id: &str) -> Result<Vec<SelectionRecord>, ApiError> {
        let raw = self.send(Method::Get, format!("/selections/{}", segment(placement_id)), None)?;
        Ok(normalize_selections(SelectionsEnvelope::parse(raw)))
    }

    pub fn add_selection(
        &self,
        placement_id: &str,
        data: &SelectionData,
    ) -> Result<SelectionRecord, ApiError> {
        let envelope: SelectionEnvelope =
            self.post(format!("/selections/{}", segment(placement_id)), data)?;
        envelope
            .selection
            .ok_or(ApiError::MissingField("Selection data not returned from API after creation."))
    }

    pub fn update_selection(
        &self,
        selection_id: &str,
        data: &SelectionData,
    ) -> Result<SelectionRecord, ApiError> {
        let envelope: SelectionEnvelope =
            self.put(format!("/selections/{}", segment(selection_id)), data)?;
        envelope
            .updated
            .ok_or(ApiError::MissingField("Updated selection data not returned from API."))
    }

    pub fn delete_selection(&self, selection_id: &str) -> Result<MessageResponse, ApiError> {
        self.delete(format!("/selections/{}", segment(selection_id)))
    }
}
