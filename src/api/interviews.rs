use serde::Deserialize;

use super::{segment, ApiClient, MessageResponse, Transport};
use crate::error::ApiError;
use crate::models::{Interview, InterviewData};

#[derive(Debug, Deserialize)]
struct InterviewEnvelope {
    #[serde(default)]
    interviews: Option<Vec<Interview>>,
    #[serde(default)]
    interview: Option<Interview>,
    #[serde(default)]
    updated: Option<Interview>,
}

impl<T: Transport> ApiClient<T> {
    /// Interview rounds of one placement. A response without `interviews`
    /// means there are none.
    pub fn list_interviews(&self, placement_id: &str) -> Result<Vec<Interview>, ApiError> {
        let envelope: InterviewEnvelope = self.get(format!("/interviews/{}", segment(placement_id)))?;
        Ok(envelope.interviews.unwrap_or_default())
    }

    pub fn add_interview(&self, placement_id: &str, data: &InterviewData) -> Result<Interview, ApiError> {
        let envelope: InterviewEnvelope =
            self.post(format!("/interviews/{}", segment(placement_id)), data)?;
        envelope
            .interview
            .ok_or(ApiError::MissingField("Interview data not returned from API after creation."))
    }

    pub fn update_interview(&self, interview_id: &str, data: &InterviewData) -> Result<Interview, ApiError> {
        let envelope: InterviewEnvelope =
            self.put(format!("/interviews/{}", segment(interview_id)), data)?;
        envelope
            .updated
            .ok_or(ApiError::MissingField("Updated interview data not returned from API."))
    }

    pub fn delete_interview(&self, interview_id: &str) -> Result<MessageResponse, ApiError> {
        self.delete(format!("/interviews/{}", segment(interview_id)))
    }
}
