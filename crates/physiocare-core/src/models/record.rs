//! Medical record and appointment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PatientDetail, PhysioRef};

/// A patient's medical record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordItem {
    /// Backend ID
    #[serde(rename = "_id")]
    pub id: String,
    /// Owning patient ID
    pub patient: String,
    /// Free-text medical history
    #[serde(default)]
    pub medical_record: Option<String>,
    /// Appointments in backend order
    #[serde(default)]
    pub appointments: Vec<AppointmentItem>,
}

/// Body for opening a record. The backend assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    /// Owning patient ID
    pub patient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_record: Option<String>,
}

/// A scheduled consultation inside a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentItem {
    #[serde(rename = "_id")]
    pub id: String,
    /// ISO-8601 timestamp
    pub date: String,
    /// Assigned physio, absent when unset or deleted
    #[serde(default)]
    pub physio: Option<PhysioRef>,
    pub diagnosis: String,
    pub treatment: String,
    #[serde(default)]
    pub observations: Option<String>,
}

/// Denormalized appointment row for list display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFlat {
    pub id: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub physio_name: String,
    #[serde(default)]
    pub physio_id: Option<String>,
    /// ISO-8601 timestamp
    pub date: String,
    pub diagnosis: String,
    pub treatment: String,
    #[serde(default)]
    pub observations: Option<String>,
}

impl AppointmentFlat {
    /// Build a flat row from a nested appointment.
    pub fn from_item(item: &AppointmentItem, patient_name: &str) -> Self {
        Self {
            id: item.id.clone(),
            patient_name: patient_name.to_string(),
            physio_name: item
                .physio
                .as_ref()
                .map(PhysioRef::display_name)
                .unwrap_or_default(),
            physio_id: item.physio.as_ref().map(|p| p.id().to_string()),
            date: item.date.clone(),
            diagnosis: item.diagnosis.clone(),
            treatment: item.treatment.clone(),
            observations: item.observations.clone(),
        }
    }

    /// Parse the appointment date.
    pub fn scheduled_at(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(&self.date).map(|d| d.with_timezone(&Utc))
    }

    /// Check if the appointment is strictly after `now`.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> Result<bool, chrono::ParseError> {
        Ok(self.scheduled_at()? > now)
    }
}

/// Body for adding an appointment to a patient's record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentRequest {
    /// ISO-8601 timestamp
    pub date: String,
    /// Assigning physio ID
    pub physio: String,
    pub diagnosis: String,
    pub treatment: String,
    pub observations: Option<String>,
}

/// Flatten every appointment of every record into display rows.
pub fn flatten_appointments(detail: &PatientDetail) -> Vec<AppointmentFlat> {
    let patient_name = detail.patient.full_name();
    detail
        .records
        .iter()
        .flat_map(|record| record.appointments.iter())
        .map(|item| AppointmentFlat::from_item(item, &patient_name))
        .collect()
}

/// Split appointments into (pending, history) around `now`.
///
/// Pending holds appointments strictly after `now`; everything else is
/// history. Order within each side is preserved.
pub fn partition_by_date(
    appointments: Vec<AppointmentFlat>,
    now: DateTime<Utc>,
) -> Result<(Vec<AppointmentFlat>, Vec<AppointmentFlat>), chrono::ParseError> {
    let mut pending = Vec::new();
    let mut history = Vec::new();

    for appointment in appointments {
        if appointment.is_upcoming(now)? {
            pending.push(appointment);
        } else {
            history.push(appointment);
        }
    }

    Ok((pending, history))
}
