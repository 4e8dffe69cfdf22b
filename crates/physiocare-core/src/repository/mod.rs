//! Repository: composes gateway calls and applies session defaults.
//!
//! This is the only layer that reads the token or user id from the session
//! store. Missing prerequisites fail locally before any request is sent;
//! backend failures surface their own message; transport errors pass through
//! unclassified.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiError, PhysioApi};
use crate::models::{
    flatten_appointments, ApiResponse, AppointmentFlat, AppointmentRequest, LoginRequest,
    LoginResponse, NewRecord, PatientDetail, PatientItem, PhysioItem, RecordItem,
};
use crate::session::{SessionError, SessionStore};

/// Repository errors.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("User id not available")]
    MissingUserId,

    #[error("User role not available")]
    MissingRole,

    #[error("No record found for this patient")]
    NoRecord,

    /// `ok=false` from the backend, carrying its message.
    #[error("{0}")]
    Backend(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl RepoError {
    /// Whether the failure is a missing prerequisite rather than a backend
    /// or transport error. `NoRecord` may follow a detail lookup.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            RepoError::InvalidToken
                | RepoError::MissingUserId
                | RepoError::MissingRole
                | RepoError::NoRecord
        )
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Map an envelope into its result or a [`RepoError::Backend`].
fn unwrap_envelope<T>(response: ApiResponse<T>, fallback: &str) -> RepoResult<T> {
    response.into_result(fallback).map_err(RepoError::Backend)
}

pub struct PhysioRepository {
    api: Arc<dyn PhysioApi>,
    session: Arc<dyn SessionStore>,
}

impl PhysioRepository {
    pub fn new(api: Arc<dyn PhysioApi>, session: Arc<dyn SessionStore>) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    fn token(&self) -> RepoResult<String> {
        self.session
            .current()
            .token()
            .map(str::to_string)
            .ok_or(RepoError::InvalidToken)
    }

    fn user_id(&self) -> RepoResult<String> {
        self.session
            .current()
            .user_id()
            .map(str::to_string)
            .ok_or(RepoError::MissingUserId)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Authenticate. The caller decides whether to persist the session.
    pub async fn login(&self, username: &str, password: &str) -> RepoResult<LoginResponse> {
        let request = LoginRequest {
            login: username.to_string(),
            password: password.to_string(),
        };
        Ok(self.api.login(&request).await?)
    }

    /// End the session. The local session is cleared even if the backend
    /// call fails.
    pub async fn logout(&self) -> RepoResult<()> {
        if let Ok(token) = self.token() {
            match self.api.logout(&token).await {
                Ok(response) if !response.ok => {
                    warn!(message = ?response.message, "backend rejected logout");
                }
                Err(e) => warn!(error = %e, "logout request failed"),
                Ok(_) => {}
            }
        }
        self.session.clear_session()?;
        Ok(())
    }

    // =========================================================================
    // Patients
    // =========================================================================

    pub async fn get_all_patients(&self) -> RepoResult<Vec<PatientItem>> {
        let token = self.token()?;
        let response = self.api.list_patients(&token).await?;
        unwrap_envelope(response, "Error loading patients")
    }

    pub async fn find_patients(
        &self,
        name: Option<&str>,
        surname: Option<&str>,
    ) -> RepoResult<Vec<PatientItem>> {
        let token = self.token()?;
        let response = self.api.find_patients(&token, name, surname).await?;
        unwrap_envelope(response, "Error searching patients")
    }

    pub async fn get_patient(&self, patient_id: &str) -> RepoResult<PatientItem> {
        let token = self.token()?;
        let response = self.api.get_patient(&token, patient_id).await?;
        unwrap_envelope(response, "Error loading profile")
    }

    /// Patient with records; shared by the patient's own view and the physio
    /// viewing a patient.
    pub async fn get_patient_detail(&self, patient_id: &str) -> RepoResult<PatientDetail> {
        let token = self.token()?;
        let response = self.api.get_patient_detail(&token, patient_id).await?;
        unwrap_envelope(response, "Error loading patient detail")
    }

    pub async fn create_patient(&self, patient: &PatientItem) -> RepoResult<PatientItem> {
        let token = self.token()?;
        let response = self.api.create_patient(&token, patient).await?;
        unwrap_envelope(response, "Error creating patient")
    }

    pub async fn update_patient(&self, patient: &PatientItem) -> RepoResult<PatientItem> {
        let token = self.token()?;
        let response = self.api.update_patient(&token, &patient.id, patient).await?;
        unwrap_envelope(response, "Error updating patient")
    }

    pub async fn delete_patient(&self, patient_id: &str) -> RepoResult<PatientItem> {
        let token = self.token()?;
        let response = self.api.delete_patient(&token, patient_id).await?;
        unwrap_envelope(response, "Error deleting patient")
    }

    // =========================================================================
    // Physios
    // =========================================================================

    pub async fn get_physios(&self) -> RepoResult<Vec<PhysioItem>> {
        let token = self.token()?;
        let response = self.api.list_physios(&token).await?;
        unwrap_envelope(response, "Error loading physios")
    }

    pub async fn find_physios(&self, specialty: Option<&str>) -> RepoResult<Vec<PhysioItem>> {
        let token = self.token()?;
        let response = self.api.find_physios(&token, specialty).await?;
        unwrap_envelope(response, "Error searching physios")
    }

    pub async fn get_physio(&self, physio_id: &str) -> RepoResult<PhysioItem> {
        let token = self.token()?;
        let response = self.api.get_physio(&token, physio_id).await?;
        unwrap_envelope(response, "Error loading physio")
    }

    pub async fn create_physio(&self, physio: &PhysioItem) -> RepoResult<PhysioItem> {
        let token = self.token()?;
        let response = self.api.create_physio(&token, physio).await?;
        unwrap_envelope(response, "Error creating physio")
    }

    pub async fn update_physio(&self, physio: &PhysioItem) -> RepoResult<PhysioItem> {
        let token = self.token()?;
        let response = self.api.update_physio(&token, &physio.id, physio).await?;
        unwrap_envelope(response, "Error updating physio")
    }

    pub async fn delete_physio(&self, physio_id: &str) -> RepoResult<PhysioItem> {
        let token = self.token()?;
        let response = self.api.delete_physio(&token, physio_id).await?;
        unwrap_envelope(response, "Error deleting physio")
    }

    // =========================================================================
    // Records & Appointments
    // =========================================================================

    pub async fn get_records(&self) -> RepoResult<Vec<RecordItem>> {
        let token = self.token()?;
        let response = self.api.list_records(&token).await?;
        unwrap_envelope(response, "Error loading records")
    }

    pub async fn get_record(&self, record_id: &str) -> RepoResult<RecordItem> {
        let token = self.token()?;
        let response = self.api.get_record(&token, record_id).await?;
        unwrap_envelope(response, "Error loading record")
    }

    /// Open a medical record for a patient that has none yet.
    pub async fn create_record(
        &self,
        patient_id: &str,
        medical_record: Option<&str>,
    ) -> RepoResult<RecordItem> {
        let token = self.token()?;
        let record = NewRecord {
            patient: patient_id.to_string(),
            medical_record: medical_record.map(str::to_string),
        };
        let response = self.api.create_record(&token, &record).await?;
        unwrap_envelope(response, "Error creating record")
    }

    /// Every appointment of the patient, flattened across records.
    ///
    /// All-or-nothing: a failed detail call fails the whole operation.
    pub async fn get_my_appointments(&self, patient_id: &str) -> RepoResult<Vec<AppointmentFlat>> {
        let detail = self.get_patient_detail(patient_id).await?;
        let appointments = flatten_appointments(&detail);
        debug!(
            patient_id,
            records = detail.records.len(),
            appointments = appointments.len(),
            "flattened patient appointments"
        );
        Ok(appointments)
    }

    /// Appointments assigned to the signed-in physio.
    pub async fn get_my_appointments_as_physio(&self) -> RepoResult<Vec<AppointmentFlat>> {
        let token = self.token()?;
        let physio_id = self.user_id()?;
        let response = self.api.appointments_by_physio(&token, &physio_id).await?;
        unwrap_envelope(response, "Error loading appointments")
    }

    /// Every appointment in the clinic (staff only).
    pub async fn get_all_appointments(&self) -> RepoResult<Vec<AppointmentFlat>> {
        let token = self.token()?;
        let response = self.api.list_appointments(&token).await?;
        unwrap_envelope(response, "Error loading appointments")
    }

    /// File a new appointment for a patient, assigned to the signed-in physio.
    ///
    /// Fails with [`RepoError::NoRecord`] if the patient has no record to
    /// file it under. Returns the updated record.
    pub async fn create_appointment_for_patient(
        &self,
        patient_id: &str,
        date: &str,
        diagnosis: &str,
        treatment: &str,
        observations: Option<&str>,
    ) -> RepoResult<RecordItem> {
        let token = self.token()?;
        let physio_id = self.user_id()?;

        let detail = unwrap_envelope(
            self.api.get_patient_detail(&token, patient_id).await?,
            "Error loading patient detail",
        )?;
        let record = detail.primary_record().ok_or(RepoError::NoRecord)?;
        debug!(patient_id, record_id = %record.id, "filing appointment");

        let request = AppointmentRequest {
            date: date.to_string(),
            physio: physio_id,
            diagnosis: diagnosis.to_string(),
            treatment: treatment.to_string(),
            observations: observations.map(str::to_string),
        };
        let response = self.api.add_appointment(&token, patient_id, &request).await?;
        unwrap_envelope(response, "Error creating appointment")
    }

    /// Delete an appointment. Returns the backend's confirmation message.
    pub async fn delete_appointment(&self, appointment_id: &str) -> RepoResult<Option<String>> {
        let token = self.token()?;
        let response = self.api.delete_appointment(&token, appointment_id).await?;
        if !response.ok {
            return Err(RepoError::Backend(
                response
                    .message
                    .unwrap_or_else(|| "Error deleting appointment".to_string()),
            ));
        }
        Ok(response.result.map(|r| r.message).or(response.message))
    }
}
