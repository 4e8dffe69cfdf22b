//! Patient detail screen.

use std::sync::Arc;

use super::{describe, StateCell, ViewState};
use crate::models::PatientDetail;
use crate::repository::PhysioRepository;

pub struct PatientDetailViewModel {
    repo: Arc<PhysioRepository>,
    state: StateCell<PatientDetail>,
}

impl PatientDetailViewModel {
    pub fn new(repo: Arc<PhysioRepository>) -> Self {
        Self {
            repo,
            state: StateCell::default(),
        }
    }

    pub fn state(&self) -> &StateCell<PatientDetail> {
        &self.state
    }

    /// Load a patient together with their records.
    pub async fn load(&self, patient_id: &str) -> Result<PatientDetail, String> {
        self.state.set(ViewState::Loading);
        let result = self
            .repo
            .get_patient_detail(patient_id)
            .await
            .map_err(|e| describe(&e));
        self.state.resolve(result)
    }
}
