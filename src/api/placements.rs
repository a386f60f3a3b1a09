use serde::Deserialize;

use super::{segment, ApiClient, MessageResponse, Transport};
use crate::error::ApiError;
use crate::forms::{PlacementPayload, UpdatePayload};
use crate::models::Placement;

/// Acknowledgement of a placement or placement-update mutation. Some backend
/// versions echo the affected placement back; callers should refetch rather
/// than rely on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MutationResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub placement: Option<Placement>,
}

#[derive(Debug, Deserialize)]
struct PlacementList {
    #[serde(default)]
    placements: Vec<Placement>,
}

#[derive(Debug, Deserialize)]
struct PlacementEnvelope {
    placement: Placement,
}

impl<T: Transport> ApiClient<T> {
    pub fn list_placements(&self) -> Result<Vec<Placement>, ApiError> {
        let list: PlacementList = self.get("/placements".to_string())?;
        Ok(list.placements)
    }

    pub fn get_placement(&self, id: &str) -> Result<Placement, ApiError> {
        let envelope: PlacementEnvelope = self.get(format!("/placements/{}", segment(id)))?;
        Ok(envelope.placement)
    }

    pub fn create_placement(&self, payload: &PlacementPayload) -> Result<MutationResponse, ApiError> {
        self.post("/placements".to_string(), payload)
    }

    pub fn update_placement(
        &self,
        id: &str,
        payload: &PlacementPayload,
    ) -> Result<MutationResponse, ApiError> {
        self.put(format!("/placements/{}", segment(id)), payload)
    }

    pub fn delete_placement(&self, id: &str) -> Result<MessageResponse, ApiError> {
        self.delete(format!("/placements/{}", segment(id)))
    }

    // --- placement updates (announcements) ---

    pub fn add_placement_update(
        &self,
        placement_id: &str,
        update: &UpdatePayload,
    ) -> Result<MutationResponse, ApiError> {
        self.post(format!("/placements/{}/updates", segment(placement_id)), update)
    }

    pub fn edit_placement_update(
        &self,
        placement_id: &str,
        update_id: &str,
        update: &UpdatePayload,
    ) -> Result<MutationResponse, ApiError> {
        self.put(
            format!("/placements/{}/updates/{}", segment(placement_id), segment(update_id)),
            update,
        )
    }

    pub fn delete_placement_update(
        &self,
        placement_id: &str,
        update_id: &str,
    ) -> Result<MutationResponse, ApiError> {
        self.delete(format!(
            "/placements/{}/updates/{}",
            segment(placement_id),
            segment(update_id)
        ))
    }
}
