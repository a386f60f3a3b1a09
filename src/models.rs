use chrono::{DateTime, Local};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Student => "student",
            Role::Admin => "admin",
        })
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}' (expected student or admin)", other)),
        }
    }
}

/// Records may carry `_id`, `id` or both (Mongoose adds `id` when virtuals are
/// on). Keep a single key, named `key`, before the derived decoder runs.
fn reconcile_id(map: &mut Map<String, Value>, key: &str) {
    let other = if key == "_id" { "id" } else { "_id" };
    if let Some(value) = map.remove(other) {
        if !map.contains_key(key) {
            map.insert(key.to_string(), value);
        }
    }
}

/// Route a record's serde impls through the `remote = "Self"` derive, with
/// [`reconcile_id`] applied on the way in.
macro_rules! keyed_record {
    ($ty:ident, $key:literal) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                $ty::serialize(self, serializer)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let mut map = Map::<String, Value>::deserialize(deserializer)?;
                reconcile_id(&mut map, $key);
                $ty::deserialize(Value::Object(map)).map_err(de::Error::custom)
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub rollno: String,
    #[serde(default)]
    pub role: Role,
}

/// Anything the backend sends outside the known values reads as `Unknown`,
/// so one odd record doesn't sink a whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PlacementStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Unknown,
}

impl PlacementStatus {
    pub fn is_unknown(&self) -> bool {
        *self == PlacementStatus::Unknown
    }
}

impl<'de> Deserialize<'de> for PlacementStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(PlacementStatus::Unknown))
    }
}

impl fmt::Display for PlacementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlacementStatus::Upcoming => "Upcoming",
            PlacementStatus::Ongoing => "Ongoing",
            PlacementStatus::Completed => "Completed",
            PlacementStatus::Unknown => "Unknown",
        })
    }
}

impl FromStr for PlacementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upcoming" => Ok(PlacementStatus::Upcoming),
            "ongoing" => Ok(PlacementStatus::Ongoing),
            "completed" => Ok(PlacementStatus::Completed),
            _ => Err("Please select a valid status.".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateType {
    Info,
    Alert,
    Reminder,
    Unknown,
}

impl<'de> Deserialize<'de> for UpdateType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(UpdateType::Unknown))
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpdateType::Info => "Info",
            UpdateType::Alert => "Alert",
            UpdateType::Reminder => "Reminder",
            UpdateType::Unknown => "Update",
        })
    }
}

impl FromStr for UpdateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(UpdateType::Info),
            "alert" => Ok(UpdateType::Alert),
            "reminder" => Ok(UpdateType::Reminder),
            _ => Err("Update type is required.".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_backlogs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_backlogs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_eligibilities: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct PlacementUpdate {
    #[serde(rename = "_id")]
    pub id: String,
    pub update_type: UpdateType,
    pub message: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct Placement {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub batches: Vec<String>,
    #[serde(default)]
    pub company: Company,
    #[serde(default)]
    pub job_designation: String,
    #[serde(default)]
    pub job_description_link: Option<String>,
    #[serde(default)]
    pub eligible_branches: Vec<String>,
    #[serde(default)]
    pub eligibility_criteria: EligibilityCriteria,
    #[serde(default)]
    pub ctc_details: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub mode_of_recruitment: Option<String>,
    #[serde(default)]
    pub tentative_drive_date: Option<String>,
    #[serde(default)]
    pub application_deadline: Option<String>,
    #[serde(default)]
    pub drive_rounds: Vec<String>,
    #[serde(default)]
    pub apply_link: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub additional_details: Option<String>,
    #[serde(default)]
    pub status: Option<PlacementStatus>,
    #[serde(default)]
    pub updates: Vec<PlacementUpdate>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Interview fields as sent on create/update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewData {
    pub interview_date: String,
    pub start_time: String,
    pub end_time: String,
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortlisted_students_doc: Option<String>,
    #[serde(default)]
    pub additional_notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct Interview {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub placement_id: String,
    #[serde(flatten)]
    pub details: InterviewData,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedStudent {
    pub name: String,
    pub rollno: String,
    pub branch: String,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Selection fields as sent on create/update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionData {
    pub selected_students: Vec<SelectedStudent>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_link: Option<String>,
    #[serde(default)]
    pub additional_notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct SelectionRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub placement_id: String,
    #[serde(flatten)]
    pub data: SelectionData,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

keyed_record!(User, "id");
keyed_record!(PlacementUpdate, "_id");
keyed_record!(Placement, "_id");
keyed_record!(Interview, "_id");
keyed_record!(SelectionRecord, "_id");

/// Render an ISO timestamp from the API as a local calendar date. Values that
/// are not RFC 3339 fall back to their date part.
pub fn display_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Local).format("%Y-%m-%d").to_string(),
        Err(_) => raw.split('T').next().unwrap_or(raw).to_string(),
    }
}

/// Same as [`display_date`] but with the local time of day.
pub fn display_datetime(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}
