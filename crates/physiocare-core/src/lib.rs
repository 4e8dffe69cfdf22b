//! PhysioCare Core Library
//!
//! Client core for the PhysioCare clinic app, shared by the mobile hosts.
//!
//! # Architecture
//!
//! ```text
//!   Screen ──▶ View model ──▶ PhysioRepository ──▶ PhysioApi (HTTP + JSON)
//!      ▲            │                 │
//!      │            ▼                 ▼
//!      └──── ViewState<T>       SessionStore ──▶ SQLite preferences
//! ```
//!
//! The session store is the only durable state. Every protected request
//! reads the bearer token from it; a missing token fails locally before any
//! request leaves the device.
//!
//! # Modules
//!
//! - [`api`]: REST gateway trait and its reqwest implementation
//! - [`config`]: Client configuration
//! - [`db`]: SQLite preferences storage
//! - [`models`]: Wire types (patients, physios, records, envelopes)
//! - [`repository`]: Composes gateway calls with session defaults
//! - [`session`]: Durable, observable session store
//! - [`state`]: Per-screen view models

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod repository;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use api::{ApiError, HttpGateway, PhysioApi};
pub use config::ClientConfig;
pub use db::Database;
pub use models::{
    ApiResponse, AppointmentFlat, PatientDetail, PatientItem, PhysioItem, RecordItem, Role,
    SessionData,
};
pub use repository::{PhysioRepository, RepoError};
pub use session::{PreferenceSessionStore, SessionStore};
pub use state::{Consultations, ScreenScope, StateCell, ViewState};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use state::{
    AppointmentDetailViewModel, AppointmentForm, ConsultationsViewModel,
    CreateAppointmentViewModel, LoginViewModel, PatientDetailViewModel, PatientsViewModel,
    PhysioDetailViewModel,
};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PhysioCareError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),

    /// Screen-level failure, carrying the message to show
    #[error("{0}")]
    Failed(String),
}

impl From<db::DbError> for PhysioCareError {
    fn from(e: db::DbError) -> Self {
        PhysioCareError::StorageError(e.to_string())
    }
}

impl From<session::SessionError> for PhysioCareError {
    fn from(e: session::SessionError) -> Self {
        PhysioCareError::StorageError(e.to_string())
    }
}

impl From<ApiError> for PhysioCareError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Url(message) => PhysioCareError::ConfigError(message),
            other => PhysioCareError::NetworkError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for PhysioCareError {
    fn from(e: serde_json::Error) -> Self {
        PhysioCareError::ConfigError(e.to_string())
    }
}

impl From<std::io::Error> for PhysioCareError {
    fn from(e: std::io::Error) -> Self {
        PhysioCareError::RuntimeError(e.to_string())
    }
}

/// Outcome of one finished screen action.
///
/// Taken from the action's return value, never from the shared view state,
/// which a concurrent call on another host thread may have overwritten.
fn settle<T>(outcome: Result<T, String>) -> Result<T, PhysioCareError> {
    outcome.map_err(PhysioCareError::Failed)
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the client with its session database at the given path.
///
/// `config_json` overrides [`ClientConfig`] fields; omitted fields keep
/// their defaults.
#[uniffi::export]
pub fn open_client(
    db_path: String,
    config_json: Option<String>,
) -> Result<Arc<PhysioCareCore>, PhysioCareError> {
    let config = parse_config(config_json)?;
    let store = PreferenceSessionStore::open(&db_path)?;
    PhysioCareCore::build(&config, Arc::new(store)).map(Arc::new)
}

/// Open the client with an in-memory session (for testing).
#[uniffi::export]
pub fn open_client_in_memory(
    config_json: Option<String>,
) -> Result<Arc<PhysioCareCore>, PhysioCareError> {
    let config = parse_config(config_json)?;
    let store = PreferenceSessionStore::open_in_memory()?;
    PhysioCareCore::build(&config, Arc::new(store)).map(Arc::new)
}

/// Install a `tracing` subscriber writing to stderr.
///
/// `filter` uses `RUST_LOG` syntax, e.g. `"physiocare_core=debug"`. Returns
/// `false` if a subscriber was already installed.
#[uniffi::export]
pub fn init_logging(filter: String) -> Result<bool, PhysioCareError> {
    let filter = EnvFilter::try_new(&filter)
        .map_err(|e| PhysioCareError::ConfigError(format!("Invalid log filter: {}", e)))?;
    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok())
}

fn parse_config(config_json: Option<String>) -> Result<ClientConfig, PhysioCareError> {
    match config_json {
        Some(json) => Ok(ClientConfig::from_json(&json)?),
        None => Ok(ClientConfig::default()),
    }
}

// =========================================================================
// Main API Object
// =========================================================================

/// Blocking facade over the async core.
///
/// Owns a multi-threaded tokio runtime; each method blocks the calling
/// thread until its screen action settles. Hosts call it off the UI thread.
#[derive(uniffi::Object)]
pub struct PhysioCareCore {
    runtime: Runtime,
    repo: Arc<PhysioRepository>,
    login: LoginViewModel,
    patients: PatientsViewModel,
    patient_detail: PatientDetailViewModel,
    consultations: ConsultationsViewModel,
    create_appointment: CreateAppointmentViewModel,
    physio_detail: PhysioDetailViewModel,
}

impl PhysioCareCore {
    fn build(
        config: &ClientConfig,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, PhysioCareError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("physiocare-core")
            .build()?;
        let api = Arc::new(HttpGateway::new(config)?);
        let repo = Arc::new(PhysioRepository::new(api, session));

        Ok(Self {
            runtime,
            login: LoginViewModel::new(repo.clone()),
            patients: PatientsViewModel::new(repo.clone()),
            patient_detail: PatientDetailViewModel::new(repo.clone()),
            consultations: ConsultationsViewModel::new(repo.clone()),
            create_appointment: CreateAppointmentViewModel::new(repo.clone()),
            physio_detail: PhysioDetailViewModel::new(repo.clone()),
            repo,
        })
    }
}

#[uniffi::export]
impl PhysioCareCore {
    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Sign in and persist the session.
    pub fn login(&self, username: String, password: String) -> Result<FfiSession, PhysioCareError> {
        let session = settle(self.runtime.block_on(self.login.login(&username, &password)))?;
        Ok(session.into())
    }

    /// Sign out. The local session is cleared even if the backend call fails.
    pub fn logout(&self) -> Result<(), PhysioCareError> {
        settle(self.runtime.block_on(self.login.logout()))
    }

    /// Currently persisted session.
    pub fn session(&self) -> FfiSession {
        self.repo.session().current().into()
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Patients visible to the signed-in user.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, PhysioCareError> {
        let patients = settle(self.runtime.block_on(self.patients.load()))?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Search patients by name and surname. Blank filters are ignored.
    pub fn search_patients(
        &self,
        name: String,
        surname: String,
    ) -> Result<Vec<FfiPatient>, PhysioCareError> {
        let patients = settle(self.runtime.block_on(self.patients.search(&name, &surname)))?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Patient with records and flattened appointments.
    pub fn patient_detail(&self, patient_id: String) -> Result<FfiPatientDetail, PhysioCareError> {
        let detail = settle(self.runtime.block_on(self.patient_detail.load(&patient_id)))?;
        Ok(detail.into())
    }

    // =========================================================================
    // Appointment Operations
    // =========================================================================

    /// Consultations for the signed-in role.
    pub fn consultations(&self) -> Result<FfiConsultations, PhysioCareError> {
        Ok(settle(self.runtime.block_on(self.consultations.load()))?.into())
    }

    /// Patients offered by the create-appointment picker.
    pub fn appointment_patients(&self) -> Result<Vec<FfiPatient>, PhysioCareError> {
        let patients = settle(self.runtime.block_on(self.create_appointment.load_patients()))?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// File a new appointment. Returns the updated record.
    pub fn create_appointment(
        &self,
        form: FfiAppointmentForm,
    ) -> Result<FfiRecord, PhysioCareError> {
        let form: AppointmentForm = form.into();
        let record = settle(self.runtime.block_on(self.create_appointment.submit(&form)))?;
        Ok(record.into())
    }

    /// Open a medical record for a patient. Returns the new record.
    pub fn create_record(
        &self,
        patient_id: String,
        medical_record: Option<String>,
    ) -> Result<FfiRecord, PhysioCareError> {
        let record = self
            .runtime
            .block_on(self.repo.create_record(&patient_id, medical_record.as_deref()))
            .map_err(|e| PhysioCareError::Failed(state::describe(&e)))?;
        Ok(record.into())
    }

    /// Delete an appointment. Returns the backend's confirmation message.
    pub fn delete_appointment(
        &self,
        appointment: FfiAppointment,
    ) -> Result<Option<String>, PhysioCareError> {
        let detail = AppointmentDetailViewModel::new(self.repo.clone(), appointment.into());
        Ok(settle(self.runtime.block_on(detail.delete()))?.message)
    }

    // =========================================================================
    // Physio Operations
    // =========================================================================

    pub fn get_physio(&self, physio_id: String) -> Result<FfiPhysio, PhysioCareError> {
        Ok(settle(self.runtime.block_on(self.physio_detail.load(&physio_id)))?.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiRole {
    Patient,
    Physio,
    Admin,
}

impl From<Role> for FfiRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Patient => FfiRole::Patient,
            Role::Physio => FfiRole::Physio,
            Role::Admin => FfiRole::Admin,
        }
    }
}

/// FFI-safe session snapshot.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSession {
    pub authenticated: bool,
    pub token: Option<String>,
    pub username: Option<String>,
    pub user_id: Option<String>,
    pub role: Option<FfiRole>,
}

impl From<SessionData> for FfiSession {
    fn from(session: SessionData) -> Self {
        Self {
            authenticated: session.is_authenticated(),
            token: session.token,
            username: session.username,
            user_id: session.user_id,
            role: session.role.map(FfiRole::from),
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub full_name: String,
    pub birth_date: String,
    pub address: Option<String>,
    pub insurance_number: String,
    pub email: String,
    pub image: Option<String>,
}

impl From<PatientItem> for FfiPatient {
    fn from(patient: PatientItem) -> Self {
        Self {
            full_name: patient.full_name(),
            id: patient.id,
            birth_date: patient.birth_date,
            address: patient.address,
            insurance_number: patient.insurance_number,
            email: patient.email,
            image: patient.image,
        }
    }
}

/// FFI-safe physio.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPhysio {
    pub id: String,
    pub full_name: String,
    pub specialty: String,
    pub license_number: String,
    pub email: String,
    pub image: Option<String>,
}

impl From<PhysioItem> for FfiPhysio {
    fn from(physio: PhysioItem) -> Self {
        Self {
            full_name: physio.full_name(),
            id: physio.id,
            specialty: physio.specialty,
            license_number: physio.license_number,
            email: physio.email,
            image: physio.image,
        }
    }
}

/// FFI-safe appointment row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: String,
    pub patient_name: String,
    pub physio_name: String,
    pub physio_id: Option<String>,
    pub date: String,
    pub diagnosis: String,
    pub treatment: String,
    pub observations: Option<String>,
}

impl From<AppointmentFlat> for FfiAppointment {
    fn from(a: AppointmentFlat) -> Self {
        Self {
            id: a.id,
            patient_name: a.patient_name,
            physio_name: a.physio_name,
            physio_id: a.physio_id,
            date: a.date,
            diagnosis: a.diagnosis,
            treatment: a.treatment,
            observations: a.observations,
        }
    }
}

impl From<FfiAppointment> for AppointmentFlat {
    fn from(a: FfiAppointment) -> Self {
        AppointmentFlat {
            id: a.id,
            patient_name: a.patient_name,
            physio_name: a.physio_name,
            physio_id: a.physio_id,
            date: a.date,
            diagnosis: a.diagnosis,
            treatment: a.treatment,
            observations: a.observations,
        }
    }
}

/// FFI-safe medical record summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRecord {
    pub id: String,
    pub patient_id: String,
    pub medical_record: Option<String>,
    pub appointment_count: u32,
}

impl From<RecordItem> for FfiRecord {
    fn from(record: RecordItem) -> Self {
        Self {
            appointment_count: record.appointments.len() as u32,
            id: record.id,
            patient_id: record.patient,
            medical_record: record.medical_record,
        }
    }
}

/// FFI-safe patient detail.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientDetail {
    pub patient: FfiPatient,
    pub records: Vec<FfiRecord>,
    pub appointments: Vec<FfiAppointment>,
}

impl From<PatientDetail> for FfiPatientDetail {
    fn from(detail: PatientDetail) -> Self {
        let appointments = models::flatten_appointments(&detail)
            .into_iter()
            .map(|a| a.into())
            .collect();
        Self {
            patient: detail.patient.into(),
            records: detail.records.into_iter().map(|r| r.into()).collect(),
            appointments,
        }
    }
}

/// FFI-safe consultation list.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum FfiConsultations {
    Physio {
        all: Vec<FfiAppointment>,
    },
    Patient {
        pending: Vec<FfiAppointment>,
        history: Vec<FfiAppointment>,
    },
}

impl From<Consultations> for FfiConsultations {
    fn from(consultations: Consultations) -> Self {
        let convert = |list: Vec<AppointmentFlat>| -> Vec<FfiAppointment> {
            list.into_iter().map(FfiAppointment::from).collect()
        };
        match consultations {
            Consultations::Physio { all } => FfiConsultations::Physio { all: convert(all) },
            Consultations::Patient { pending, history } => FfiConsultations::Patient {
                pending: convert(pending),
                history: convert(history),
            },
        }
    }
}

/// FFI-safe create-appointment form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentForm {
    pub patient_id: String,
    /// `yyyy-MM-dd` or a full RFC 3339 timestamp
    pub date: String,
    pub diagnosis: String,
    pub treatment: String,
    pub observations: String,
}

impl From<FfiAppointmentForm> for AppointmentForm {
    fn from(form: FfiAppointmentForm) -> Self {
        AppointmentForm {
            patient_id: form.patient_id,
            date: form.date,
            diagnosis: form.diagnosis,
            treatment: form.treatment,
            observations: form.observations,
        }
    }
}
