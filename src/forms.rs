//! Form input, validation, and the transformation of free-text form fields
//! into the payloads the API expects.
//!
//! Every form validates into either its payload or a [`FieldErrors`] map, so
//! nothing reaches the network until the whole form checks out.

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

use crate::models::{
    Company, EligibilityCriteria, Interview, InterviewData, Placement, PlacementStatus, Role,
    SelectedStudent, SelectionData, SelectionRecord, UpdateType,
};
use crate::validation::{FieldErrors, FORM_KEY, is_deadline_selectable};

pub const MAX_UPDATE_MESSAGE_CHARS: usize = 500;
pub const MIN_PASSWORD_CHARS: usize = 6;

// --- Free-text transformers ---

/// Split a comma-separated field: `"CSE, ECE,  ,IT"` -> `["CSE", "ECE", "IT"]`.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split a newline-separated field, trimming and dropping blank lines.
pub fn split_lines(s: &str) -> Vec<String> {
    s.lines()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Blank text becomes `None`; anything else passes through untouched.
pub fn optional_text(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn optional_list(s: &str, split: fn(&str) -> Vec<String>) -> Option<Vec<String>> {
    if s.trim().is_empty() { None } else { Some(split(s)) }
}

// --- Auth forms ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(self) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.email("email", &self.email);
        errors.required("password", &self.password, "Password is required");
        errors.into_result(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub rollno: String,
    pub role: Role,
}

impl SignupForm {
    pub fn validate(self) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.required("name", &self.name, "Name is required");
        errors.email("email", &self.email);
        errors.min_len(
            "password",
            &self.password,
            MIN_PASSWORD_CHARS,
            "Password must be at least 6 characters",
        );
        errors.required("rollno", &self.rollno, "Roll number is required");
        errors.into_result(self)
    }
}

/// Body of `PUT /auth/me`. Absent fields are left unchanged by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Current password, required alongside `new_password`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

impl UserUpdate {
    /// Drop blank fields, then apply the cross-field rules.
    pub fn validate(self) -> Result<Self, FieldErrors> {
        let update = Self {
            name: self.name.filter(|s| !s.trim().is_empty()),
            email: self.email.filter(|s| !s.trim().is_empty()),
            password: self.password.filter(|s| !s.is_empty()),
            new_password: self.new_password.filter(|s| !s.is_empty()),
        };

        let mut errors = FieldErrors::new();
        if let Some(email) = &update.email {
            errors.email("email", email);
        }
        if let Some(new_password) = &update.new_password {
            errors.min_len(
                "newPassword",
                new_password,
                MIN_PASSWORD_CHARS,
                "New password must be at least 6 characters",
            );
            match &update.password {
                None => errors.add("password", "Current password is required to set a new password."),
                Some(current) if current == new_password => errors.add(
                    "newPassword",
                    "New password cannot be the same as the current password.",
                ),
                Some(_) => {}
            }
        }
        let changes_password = update.password.is_some() && update.new_password.is_some();
        if update.name.is_none() && update.email.is_none() && !changes_password {
            errors.add(FORM_KEY, "Please provide details to update.");
        }
        errors.into_result(update)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
}

impl ProfileForm {
    pub fn validate(self) -> Result<UserUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.required("name", &self.name, "Name is required");
        errors.email("email", &self.email);
        errors.into_result(UserUpdate {
            name: Some(self.name),
            email: Some(self.email),
            ..UserUpdate::default()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordForm {
    pub password: String,
    pub new_password: String,
}

impl PasswordForm {
    pub fn validate(self) -> Result<UserUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.required("password", &self.password, "Current password is required");
        errors.min_len(
            "newPassword",
            &self.new_password,
            MIN_PASSWORD_CHARS,
            "New password must be at least 6 characters",
        );
        if !self.password.is_empty() && self.password == self.new_password {
            errors.add("newPassword", "New password must be different from current password");
        }
        errors.into_result(UserUpdate {
            password: Some(self.password),
            new_password: Some(self.new_password),
            ..UserUpdate::default()
        })
    }
}

// --- Placement form ---

/// Add/edit placement form. List fields are free text: comma-separated for
/// batches, branches, eligibilities and selection rounds; one note per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementForm {
    pub title: String,
    pub batches: String,
    pub company_name: String,
    pub company_description: String,
    pub company_website: String,
    pub job_designation: String,
    pub job_description_link: String,
    pub eligible_branches: String,
    pub active_backlogs: String,
    pub dead_backlogs: String,
    pub other_eligibilities: String,
    pub ctc_details: String,
    pub location: String,
    pub mode_of_recruitment: String,
    pub tentative_drive_date: Option<NaiveDate>,
    pub application_deadline: Option<NaiveDate>,
    pub selection_process: String,
    pub registration_link: String,
    pub notes: String,
    pub additional_details: String,
    pub status: PlacementStatus,
}

/// Body of `POST /placements` and `PUT /placements/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementPayload {
    pub title: String,
    pub batches: Vec<String>,
    pub company: Company,
    pub job_designation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description_link: Option<String>,
    pub eligible_branches: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility_criteria: Option<EligibilityCriteria>,
    pub ctc_details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_of_recruitment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tentative_drive_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_rounds: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<String>,
    /// An unrecognized status read from the backend is left out, so an edit
    /// keeps whatever the backend has.
    #[serde(skip_serializing_if = "PlacementStatus::is_unknown")]
    pub status: PlacementStatus,
}

impl PlacementForm {
    /// Prefill from an existing placement so an edit can change a few fields
    /// and resubmit the rest as they were.
    pub fn from_placement(p: &Placement) -> Self {
        let criteria = &p.eligibility_criteria;
        Self {
            title: p.title.clone(),
            batches: p.batches.join(", "),
            company_name: p.company.name.clone(),
            company_description: p.company.description.clone().unwrap_or_default(),
            company_website: p.company.website.clone().unwrap_or_default(),
            job_designation: p.job_designation.clone(),
            job_description_link: p.job_description_link.clone().unwrap_or_default(),
            eligible_branches: p.eligible_branches.join(", "),
            active_backlogs: criteria.active_backlogs.clone().unwrap_or_default(),
            dead_backlogs: criteria.dead_backlogs.clone().unwrap_or_default(),
            other_eligibilities: criteria
                .other_eligibilities
                .as_ref()
                .map(|v| v.join(", "))
                .unwrap_or_default(),
            ctc_details: p.ctc_details.clone(),
            location: p.location.clone().unwrap_or_default(),
            mode_of_recruitment: p.mode_of_recruitment.clone().unwrap_or_default(),
            tentative_drive_date: p.tentative_drive_date.as_deref().and_then(api_date),
            application_deadline: p.application_deadline.as_deref().and_then(api_date),
            selection_process: p.drive_rounds.join(", "),
            registration_link: p.apply_link.clone().unwrap_or_default(),
            notes: p.notes.join("\n"),
            additional_details: p.additional_details.clone().unwrap_or_default(),
            status: p.status.unwrap_or_default(),
        }
    }

    /// Validate a new placement. The deadline must not be in the past.
    pub fn validate_new(&self, now: DateTime<Local>) -> Result<PlacementPayload, FieldErrors> {
        let mut errors = self.check_fields();
        if let Some(deadline) = self.application_deadline {
            if !is_deadline_selectable(deadline, now) {
                errors.add("applicationDeadline", "Application deadline cannot be in the past");
            }
        }
        errors.into_result(self.to_payload())
    }

    /// Validate an edit. Existing deadlines may already have passed.
    pub fn validate_edit(&self) -> Result<PlacementPayload, FieldErrors> {
        self.check_fields().into_result(self.to_payload())
    }

    fn check_fields(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.required("title", &self.title, "Placement title is required");
        errors.required(
            "batches",
            &self.batches,
            "Batches are required (comma-separated). Example: 2025, 2026",
        );
        errors.required("company.name", &self.company_name, "Company name is required");
        errors.optional_url("company.website", &self.company_website, "Invalid company website URL");
        errors.required("jobDesignation", &self.job_designation, "Job designation is required");
        errors.optional_url(
            "jobDescriptionLink",
            &self.job_description_link,
            "Invalid job description link URL",
        );
        errors.required(
            "eligibleBranches",
            &self.eligible_branches,
            "Eligible branches are required (comma-separated). Example: CSE, ECE, ME",
        );
        errors.required("ctcDetails", &self.ctc_details, "CTC details are required");
        errors.optional_url("registrationLink", &self.registration_link, "Invalid registration link URL");
        errors
    }

    /// Purely syntactic: splits list fields and blanks out empty optionals.
    pub fn to_payload(&self) -> PlacementPayload {
        let criteria = EligibilityCriteria {
            active_backlogs: optional_text(&self.active_backlogs),
            dead_backlogs: optional_text(&self.dead_backlogs),
            other_eligibilities: optional_list(&self.other_eligibilities, split_list),
        };
        let eligibility_criteria = if criteria == EligibilityCriteria::default() {
            None
        } else {
            Some(criteria)
        };

        PlacementPayload {
            title: self.title.clone(),
            batches: split_list(&self.batches),
            company: Company {
                name: self.company_name.clone(),
                description: optional_text(&self.company_description),
                website: optional_text(&self.company_website),
            },
            job_designation: self.job_designation.clone(),
            job_description_link: optional_text(&self.job_description_link),
            eligible_branches: split_list(&self.eligible_branches),
            eligibility_criteria,
            ctc_details: self.ctc_details.clone(),
            location: optional_text(&self.location),
            mode_of_recruitment: optional_text(&self.mode_of_recruitment),
            tentative_drive_date: self.tentative_drive_date,
            application_deadline: self.application_deadline,
            drive_rounds: optional_list(&self.selection_process, split_list),
            apply_link: optional_text(&self.registration_link),
            notes: optional_list(&self.notes, split_lines),
            additional_details: optional_text(&self.additional_details),
            status: self.status,
        }
    }
}

/// Calendar date of an API timestamp, in local time.
fn api_date(raw: &str) -> Option<NaiveDate> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Local).date_naive()),
        Err(_) => raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
    }
}

// --- Placement update form ---

/// Body of the placement-update endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    pub update_type: UpdateType,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateForm {
    pub update_type: String,
    pub message: String,
}

impl UpdateForm {
    pub fn validate(&self) -> Result<UpdatePayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let update_type = match self.update_type.parse::<UpdateType>() {
            Ok(t) => Some(t),
            Err(msg) => {
                errors.add("updateType", msg);
                None
            }
        };
        errors.required("message", &self.message, "Message cannot be empty.");
        if self.message.chars().count() > MAX_UPDATE_MESSAGE_CHARS {
            errors.add("message", "Message is too long.");
        }
        match update_type {
            Some(update_type) => errors.into_result(UpdatePayload {
                update_type,
                message: self.message.clone(),
            }),
            None => Err(errors),
        }
    }
}

// --- Interview form ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterviewForm {
    pub interview_date: String,
    pub start_time: String,
    pub end_time: String,
    pub mode: String,
    pub meeting_link: String,
    pub shortlisted_students_doc: String,
    pub additional_notes: String,
}

impl InterviewForm {
    pub fn from_interview(interview: &Interview) -> Self {
        let d = &interview.details;
        Self {
            interview_date: d.interview_date.split('T').next().unwrap_or_default().to_string(),
            start_time: d.start_time.clone(),
            end_time: d.end_time.clone(),
            mode: d.mode.clone(),
            meeting_link: d.meeting_link.clone().unwrap_or_default(),
            shortlisted_students_doc: d.shortlisted_students_doc.clone().unwrap_or_default(),
            additional_notes: d.additional_notes.join("\n"),
        }
    }

    pub fn validate(&self) -> Result<InterviewData, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.required("interviewDate", &self.interview_date, "Interview date is required");
        errors.required("startTime", &self.start_time, "Start time is required");
        errors.required("endTime", &self.end_time, "End time is required");
        errors.required("mode", &self.mode, "Mode is required");
        errors.optional_url("meetingLink", &self.meeting_link, "Must be a valid URL");
        errors.optional_url(
            "shortlistedStudentsDoc",
            &self.shortlisted_students_doc,
            "Must be a valid URL",
        );
        errors.into_result(InterviewData {
            interview_date: self.interview_date.trim().to_string(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            mode: self.mode.clone(),
            meeting_link: optional_text(&self.meeting_link),
            shortlisted_students_doc: optional_text(&self.shortlisted_students_doc),
            additional_notes: split_lines(&self.additional_notes),
        })
    }
}

// --- Selection form ---

/// One editable row of the selected-students table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentRow {
    pub name: String,
    pub rollno: String,
    pub branch: String,
    pub id: Option<String>,
}

impl StudentRow {
    /// Parse `"name, rollno, branch"`. Missing parts stay empty so the
    /// validator can report them.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.splitn(3, ',').map(|p| p.trim().to_string());
        Self {
            name: parts.next().unwrap_or_default(),
            rollno: parts.next().unwrap_or_default(),
            branch: parts.next().unwrap_or_default(),
            id: None,
        }
    }

    fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.rollno.trim().is_empty() && !self.branch.trim().is_empty()
    }

    fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.rollno.trim().is_empty() && self.branch.trim().is_empty()
    }
}

/// Keep complete rows, skip fully blank ones, and reject any row that is only
/// partly filled in. An empty result means there is nothing to submit.
pub fn validate_students(rows: &[StudentRow]) -> Result<Vec<SelectedStudent>, FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut students = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        if row.is_blank() {
            continue;
        }
        if !row.is_complete() {
            for (field, value) in [("name", &row.name), ("rollno", &row.rollno), ("branch", &row.branch)] {
                if value.trim().is_empty() {
                    errors.add(&format!("selectedStudents.{}.{}", i, field), "is required");
                }
            }
            continue;
        }
        students.push(SelectedStudent {
            name: row.name.trim().to_string(),
            rollno: row.rollno.trim().to_string(),
            branch: row.branch.trim().to_string(),
            id: row.id.clone(),
        });
    }

    if !errors.is_empty() {
        errors.add(
            FORM_KEY,
            "Please ensure all selected students have a name, roll number, and branch.",
        );
    }
    errors.into_result(students)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionForm {
    pub students: Vec<StudentRow>,
    pub next_steps: String,
    pub document_link: String,
    pub additional_notes: String,
}

impl SelectionForm {
    pub fn from_record(record: &SelectionRecord) -> Self {
        Self {
            students: record
                .data
                .selected_students
                .iter()
                .map(|s| StudentRow {
                    name: s.name.clone(),
                    rollno: s.rollno.clone(),
                    branch: s.branch.clone(),
                    id: s.id.clone(),
                })
                .collect(),
            next_steps: record.data.next_steps.join("\n"),
            document_link: record.data.document_link.clone().unwrap_or_default(),
            additional_notes: record.data.additional_notes.join("\n"),
        }
    }

    /// `Ok(None)` when no student rows carry any data: the form is a no-op.
    pub fn validate(&self) -> Result<Option<SelectionData>, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.optional_url("documentLink", &self.document_link, "Must be a valid URL");

        let students = match validate_students(&self.students) {
            Ok(students) => students,
            Err(student_errors) => {
                for (field, message) in student_errors.iter() {
                    errors.add(field, message);
                }
                Vec::new()
            }
        };
        if !errors.is_empty() {
            return Err(errors);
        }
        if students.is_empty() {
            return Ok(None);
        }

        Ok(Some(SelectionData {
            selected_students: students,
            next_steps: split_lines(&self.next_steps),
            document_link: optional_text(&self.document_link),
            additional_notes: split_lines(&self.additional_notes),
        }))
    }
}
