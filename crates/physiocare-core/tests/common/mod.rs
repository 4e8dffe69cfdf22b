//! Shared fixtures: a scripted in-memory [`PhysioApi`] and model builders.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use physiocare_core::api::{ApiError, ApiResult, PhysioApi};
use physiocare_core::models::{
    ApiResponse, AppointmentFlat, AppointmentItem, AppointmentRequest, LoginRequest,
    LoginResponse, MessageResponse, NewRecord, PatientDetail, PatientItem, PhysioItem,
    RecordItem, Role,
};
use physiocare_core::repository::PhysioRepository;
use physiocare_core::session::{PreferenceSessionStore, SessionStore};

/// Canned responses. Calls with nothing scripted fail with HTTP 503.
#[derive(Default)]
pub struct Script {
    pub login: Option<LoginResponse>,
    pub logout: Option<ApiResponse<MessageResponse>>,
    pub patients: Option<ApiResponse<Vec<PatientItem>>>,
    pub patient: Option<ApiResponse<PatientItem>>,
    pub detail: Option<ApiResponse<PatientDetail>>,
    pub physio: Option<ApiResponse<PhysioItem>>,
    pub all_appointments: Option<ApiResponse<Vec<AppointmentFlat>>>,
    pub new_record: Option<ApiResponse<RecordItem>>,
    pub add_appointment: Option<ApiResponse<RecordItem>>,
    pub delete_appointment: Option<ApiResponse<MessageResponse>>,
    /// Consumed one per call; a gate holds the response until it fires
    pub physio_appointments: VecDeque<(
        Option<oneshot::Receiver<()>>,
        ApiResponse<Vec<AppointmentFlat>>,
    )>,
}

#[derive(Default)]
pub struct FakeApi {
    pub script: Mutex<Script>,
    calls: Mutex<Vec<String>>,
    appointment_requests: Mutex<Vec<(String, AppointmentRequest)>>,
}

impl FakeApi {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            ..Default::default()
        })
    }

    /// Every call made so far, as `name token arg`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn appointment_requests(&self) -> Vec<(String, AppointmentRequest)> {
        self.appointment_requests.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn reply<T: Clone>(&self, pick: impl FnOnce(&Script) -> Option<T>) -> ApiResult<T> {
        let script = self.script.lock().unwrap();
        pick(&script).ok_or_else(unscripted)
    }
}

fn unscripted() -> ApiError {
    ApiError::Status {
        status: 503,
        body: "unscripted".into(),
    }
}

#[async_trait]
impl PhysioApi for FakeApi {
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.record(format!("login {}", request.login));
        self.reply(|s| s.login.clone())
    }

    async fn logout(&self, token: &str) -> ApiResult<ApiResponse<MessageResponse>> {
        self.record(format!("logout {}", token));
        self.reply(|s| s.logout.clone())
    }

    async fn list_patients(&self, token: &str) -> ApiResult<ApiResponse<Vec<PatientItem>>> {
        self.record(format!("list_patients {}", token));
        self.reply(|s| s.patients.clone())
    }

    async fn find_patients(
        &self,
        token: &str,
        name: Option<&str>,
        surname: Option<&str>,
    ) -> ApiResult<ApiResponse<Vec<PatientItem>>> {
        self.record(format!(
            "find_patients {} {} {}",
            token,
            name.unwrap_or("-"),
            surname.unwrap_or("-")
        ));
        self.reply(|s| s.patients.clone())
    }

    async fn get_patient(&self, token: &str, id: &str) -> ApiResult<ApiResponse<PatientItem>> {
        self.record(format!("get_patient {} {}", token, id));
        self.reply(|s| s.patient.clone())
    }

    async fn get_patient_detail(
        &self,
        token: &str,
        id: &str,
    ) -> ApiResult<ApiResponse<PatientDetail>> {
        self.record(format!("get_patient_detail {} {}", token, id));
        self.reply(|s| s.detail.clone())
    }

    async fn create_patient(
        &self,
        token: &str,
        patient: &PatientItem,
    ) -> ApiResult<ApiResponse<PatientItem>> {
        self.record(format!("create_patient {} {}", token, patient.id));
        self.reply(|s| s.patient.clone())
    }

    async fn update_patient(
        &self,
        token: &str,
        id: &str,
        _patient: &PatientItem,
    ) -> ApiResult<ApiResponse<PatientItem>> {
        self.record(format!("update_patient {} {}", token, id));
        self.reply(|s| s.patient.clone())
    }

    async fn delete_patient(&self, token: &str, id: &str) -> ApiResult<ApiResponse<PatientItem>> {
        self.record(format!("delete_patient {} {}", token, id));
        self.reply(|s| s.patient.clone())
    }

    async fn list_physios(&self, token: &str) -> ApiResult<ApiResponse<Vec<PhysioItem>>> {
        self.record(format!("list_physios {}", token));
        Err(unscripted())
    }

    async fn find_physios(
        &self,
        token: &str,
        _specialty: Option<&str>,
    ) -> ApiResult<ApiResponse<Vec<PhysioItem>>> {
        self.record(format!("find_physios {}", token));
        Err(unscripted())
    }

    async fn get_physio(&self, token: &str, id: &str) -> ApiResult<ApiResponse<PhysioItem>> {
        self.record(format!("get_physio {} {}", token, id));
        self.reply(|s| s.physio.clone())
    }

    async fn create_physio(
        &self,
        token: &str,
        _physio: &PhysioItem,
    ) -> ApiResult<ApiResponse<PhysioItem>> {
        self.record(format!("create_physio {}", token));
        self.reply(|s| s.physio.clone())
    }

    async fn update_physio(
        &self,
        token: &str,
        id: &str,
        _physio: &PhysioItem,
    ) -> ApiResult<ApiResponse<PhysioItem>> {
        self.record(format!("update_physio {} {}", token, id));
        self.reply(|s| s.physio.clone())
    }

    async fn delete_physio(&self, token: &str, id: &str) -> ApiResult<ApiResponse<PhysioItem>> {
        self.record(format!("delete_physio {} {}", token, id));
        self.reply(|s| s.physio.clone())
    }

    async fn list_records(&self, token: &str) -> ApiResult<ApiResponse<Vec<RecordItem>>> {
        self.record(format!("list_records {}", token));
        Err(unscripted())
    }

    async fn get_record(&self, token: &str, id: &str) -> ApiResult<ApiResponse<RecordItem>> {
        self.record(format!("get_record {} {}", token, id));
        Err(unscripted())
    }

    async fn create_record(
        &self,
        token: &str,
        record: &NewRecord,
    ) -> ApiResult<ApiResponse<RecordItem>> {
        self.record(format!("create_record {} {}", token, record.patient));
        self.reply(|s| s.new_record.clone())
    }

    async fn list_appointments(
        &self,
        token: &str,
    ) -> ApiResult<ApiResponse<Vec<AppointmentFlat>>> {
        self.record(format!("list_appointments {}", token));
        self.reply(|s| s.all_appointments.clone())
    }

    async fn add_appointment(
        &self,
        token: &str,
        patient_id: &str,
        request: &AppointmentRequest,
    ) -> ApiResult<ApiResponse<RecordItem>> {
        self.record(format!("add_appointment {} {}", token, patient_id));
        self.appointment_requests
            .lock()
            .unwrap()
            .push((patient_id.to_string(), request.clone()));
        self.reply(|s| s.add_appointment.clone())
    }

    async fn appointments_by_physio(
        &self,
        token: &str,
        physio_id: &str,
    ) -> ApiResult<ApiResponse<Vec<AppointmentFlat>>> {
        self.record(format!("appointments_by_physio {} {}", token, physio_id));
        let next = self.script.lock().unwrap().physio_appointments.pop_front();
        let (gate, response) = next.ok_or_else(unscripted)?;
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(response)
    }

    async fn delete_appointment(
        &self,
        token: &str,
        appointment_id: &str,
    ) -> ApiResult<ApiResponse<MessageResponse>> {
        self.record(format!("delete_appointment {} {}", token, appointment_id));
        self.reply(|s| s.delete_appointment.clone())
    }
}

// =========================================================================
// Builders
// =========================================================================

/// In-memory session store, optionally signed in.
pub fn session_with(
    token: Option<&str>,
    user_id: Option<&str>,
    role: Option<Role>,
) -> Arc<PreferenceSessionStore> {
    let store = PreferenceSessionStore::open_in_memory().unwrap();
    if let Some(token) = token {
        store
            .save_session(token, "tester", user_id.unwrap_or_default(), role)
            .unwrap();
    }
    Arc::new(store)
}

pub fn make_repo(api: Arc<FakeApi>, session: Arc<PreferenceSessionStore>) -> Arc<PhysioRepository> {
    Arc::new(PhysioRepository::new(api, session))
}

pub fn make_patient(id: &str, name: &str, surname: &str) -> PatientItem {
    PatientItem {
        id: id.to_string(),
        name: name.to_string(),
        surname: surname.to_string(),
        birth_date: "1990-04-12T00:00:00.000Z".to_string(),
        address: None,
        insurance_number: format!("INS-{}", id),
        email: format!("{}@example.com", id),
        image: None,
    }
}

pub fn make_physio(id: &str) -> PhysioItem {
    PhysioItem {
        id: id.to_string(),
        name: "Marta".to_string(),
        surname: "Soler".to_string(),
        specialty: "Sports".to_string(),
        license_number: "LIC-0042".to_string(),
        email: "marta@example.com".to_string(),
        image: None,
    }
}

pub fn make_appointment(id: &str, date: &str) -> AppointmentItem {
    AppointmentItem {
        id: id.to_string(),
        date: date.to_string(),
        physio: None,
        diagnosis: "Lumbalgia".to_string(),
        treatment: "Masaje".to_string(),
        observations: None,
    }
}

pub fn make_record(id: &str, patient_id: &str, appointments: Vec<AppointmentItem>) -> RecordItem {
    RecordItem {
        id: id.to_string(),
        patient: patient_id.to_string(),
        medical_record: None,
        appointments,
    }
}

pub fn make_detail(patient: PatientItem, records: Vec<RecordItem>) -> PatientDetail {
    PatientDetail { patient, records }
}

pub fn make_flat(id: &str, date: &str) -> AppointmentFlat {
    AppointmentFlat {
        id: id.to_string(),
        patient_name: "Lucía Pérez".to_string(),
        physio_name: "Marta Soler".to_string(),
        physio_id: Some("ph-1".to_string()),
        date: date.to_string(),
        diagnosis: "Lumbalgia".to_string(),
        treatment: "Masaje".to_string(),
        observations: None,
    }
}
