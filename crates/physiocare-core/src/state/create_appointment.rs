//! Create-appointment screen.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate};

use super::{describe, StateCell, ViewState};
use crate::models::{PatientItem, RecordItem};
use crate::repository::PhysioRepository;

pub const MISSING_FIELDS: &str = "Patient, date, diagnosis and treatment are required";
pub const INVALID_DATE_FORMAT: &str = "Date must be yyyy-MM-dd";

/// Time of day assigned to appointments entered as a bare date.
const DEFAULT_TIME: &str = "T09:00:00Z";

/// Form input for a new appointment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentForm {
    pub patient_id: String,
    /// `yyyy-MM-dd`, or a full RFC 3339 timestamp
    pub date: String,
    pub diagnosis: String,
    pub treatment: String,
    pub observations: String,
}

pub struct CreateAppointmentViewModel {
    repo: Arc<PhysioRepository>,
    patients: StateCell<Vec<PatientItem>>,
    submission: StateCell<RecordItem>,
}

impl CreateAppointmentViewModel {
    pub fn new(repo: Arc<PhysioRepository>) -> Self {
        Self {
            repo,
            patients: StateCell::default(),
            submission: StateCell::default(),
        }
    }

    /// Patient picker options.
    pub fn patients(&self) -> &StateCell<Vec<PatientItem>> {
        &self.patients
    }

    /// Outcome of the last submit. Success carries the updated record.
    pub fn submission(&self) -> &StateCell<RecordItem> {
        &self.submission
    }

    pub async fn load_patients(&self) -> Result<Vec<PatientItem>, String> {
        self.patients.set(ViewState::Loading);
        let result = self
            .repo
            .get_all_patients()
            .await
            .map_err(|e| describe(&e));
        self.patients.resolve(result)
    }

    /// Validate the form and file the appointment.
    ///
    /// Validation failures resolve to `Error` without any request.
    pub async fn submit(&self, form: &AppointmentForm) -> Result<RecordItem, String> {
        let patient_id = form.patient_id.trim();
        let diagnosis = form.diagnosis.trim();
        let treatment = form.treatment.trim();
        if patient_id.is_empty()
            || form.date.trim().is_empty()
            || diagnosis.is_empty()
            || treatment.is_empty()
        {
            return self.submission.resolve(Err(MISSING_FIELDS.to_string()));
        }

        let Some(date) = expand_date(&form.date) else {
            return self.submission.resolve(Err(INVALID_DATE_FORMAT.to_string()));
        };
        let observations = Some(form.observations.trim()).filter(|o| !o.is_empty());

        self.submission.set(ViewState::Loading);
        let result = self
            .repo
            .create_appointment_for_patient(patient_id, &date, diagnosis, treatment, observations)
            .await
            .map_err(|e| describe(&e));
        self.submission.resolve(result)
    }
}

/// Expand a `yyyy-MM-dd` date to `yyyy-MM-ddT09:00:00Z`.
///
/// Full RFC 3339 timestamps pass through unchanged; anything else is `None`.
pub fn expand_date(input: &str) -> Option<String> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(format!("{}{}", date.format("%Y-%m-%d"), DEFAULT_TIME));
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|_| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_bare_date() {
        assert_eq!(
            expand_date("2024-06-15"),
            Some("2024-06-15T09:00:00Z".to_string())
        );
        assert_eq!(
            expand_date(" 2024-06-15 "),
            Some("2024-06-15T09:00:00Z".to_string())
        );
    }

    #[test]
    fn test_expand_keeps_full_timestamp() {
        assert_eq!(
            expand_date("2024-06-15T16:30:00+02:00"),
            Some("2024-06-15T16:30:00+02:00".to_string())
        );
    }

    #[test]
    fn test_expand_rejects_other_formats() {
        assert_eq!(expand_date("15/06/2024"), None);
        assert_eq!(expand_date("2024-02-30"), None);
        assert_eq!(expand_date(""), None);
    }
}
