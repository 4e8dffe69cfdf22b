//! Remote API gateway.
//!
//! [`PhysioApi`] describes every backend endpoint the client consumes. The
//! gateway is stateless with respect to the session: protected calls take the
//! bearer token as an argument.

mod http;

pub use http::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    ApiResponse, AppointmentFlat, AppointmentRequest, LoginRequest, LoginResponse,
    MessageResponse, NewRecord, PatientDetail, PatientItem, PhysioItem, RecordItem,
};

/// Transport and decoding failures.
///
/// Backend-reported failures (`ok=false`) are not errors at this layer; they
/// come back as envelopes.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected HTTP status {status}")]
    Status { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    Url(String),

    /// Empty or dot-only id, rejected before sending
    #[error("Invalid id: '{0}'")]
    InvalidId(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait PhysioApi: Send + Sync {
    // ── Auth ──────────────────────────────────────────────────

    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse>;

    async fn logout(&self, token: &str) -> ApiResult<ApiResponse<MessageResponse>>;

    // ── Patients ──────────────────────────────────────────────

    async fn list_patients(&self, token: &str) -> ApiResult<ApiResponse<Vec<PatientItem>>>;

    /// Search by name and/or surname; `None` filters are omitted.
    async fn find_patients(
        &self,
        token: &str,
        name: Option<&str>,
        surname: Option<&str>,
    ) -> ApiResult<ApiResponse<Vec<PatientItem>>>;

    async fn get_patient(&self, token: &str, id: &str) -> ApiResult<ApiResponse<PatientItem>>;

    /// Patient together with their records.
    async fn get_patient_detail(
        &self,
        token: &str,
        id: &str,
    ) -> ApiResult<ApiResponse<PatientDetail>>;

    async fn create_patient(
        &self,
        token: &str,
        patient: &PatientItem,
    ) -> ApiResult<ApiResponse<PatientItem>>;

    async fn update_patient(
        &self,
        token: &str,
        id: &str,
        patient: &PatientItem,
    ) -> ApiResult<ApiResponse<PatientItem>>;

    async fn delete_patient(&self, token: &str, id: &str) -> ApiResult<ApiResponse<PatientItem>>;

    // ── Physios ───────────────────────────────────────────────

    async fn list_physios(&self, token: &str) -> ApiResult<ApiResponse<Vec<PhysioItem>>>;

    async fn find_physios(
        &self,
        token: &str,
        specialty: Option<&str>,
    ) -> ApiResult<ApiResponse<Vec<PhysioItem>>>;

    async fn get_physio(&self, token: &str, id: &str) -> ApiResult<ApiResponse<PhysioItem>>;

    async fn create_physio(
        &self,
        token: &str,
        physio: &PhysioItem,
    ) -> ApiResult<ApiResponse<PhysioItem>>;

    async fn update_physio(
        &self,
        token: &str,
        id: &str,
        physio: &PhysioItem,
    ) -> ApiResult<ApiResponse<PhysioItem>>;

    async fn delete_physio(&self, token: &str, id: &str) -> ApiResult<ApiResponse<PhysioItem>>;

    // ── Records & appointments ────────────────────────────────

    async fn list_records(&self, token: &str) -> ApiResult<ApiResponse<Vec<RecordItem>>>;

    async fn get_record(&self, token: &str, id: &str) -> ApiResult<ApiResponse<RecordItem>>;

    /// Open a new medical record for a patient.
    async fn create_record(
        &self,
        token: &str,
        record: &NewRecord,
    ) -> ApiResult<ApiResponse<RecordItem>>;

    /// Every appointment (staff only).
    async fn list_appointments(&self, token: &str)
        -> ApiResult<ApiResponse<Vec<AppointmentFlat>>>;

    /// Add an appointment to the patient's record. Returns the updated record.
    async fn add_appointment(
        &self,
        token: &str,
        patient_id: &str,
        request: &AppointmentRequest,
    ) -> ApiResult<ApiResponse<RecordItem>>;

    async fn appointments_by_physio(
        &self,
        token: &str,
        physio_id: &str,
    ) -> ApiResult<ApiResponse<Vec<AppointmentFlat>>>;

    async fn delete_appointment(
        &self,
        token: &str,
        appointment_id: &str,
    ) -> ApiResult<ApiResponse<MessageResponse>>;
}
