//! Consultation list screen.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::{describe, StateCell, ViewState};
use crate::models::{partition_by_date, AppointmentFlat, Role};
use crate::repository::{PhysioRepository, RepoError};

pub const INVALID_DATE: &str = "Invalid appointment date";

/// Source of "now" used to split pending from past consultations.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Consultations as shown to each role.
#[derive(Debug, Clone, PartialEq)]
pub enum Consultations {
    /// Staff see one flat list
    Physio { all: Vec<AppointmentFlat> },
    /// Patients see upcoming and past consultations separately
    Patient {
        pending: Vec<AppointmentFlat>,
        history: Vec<AppointmentFlat>,
    },
}

impl Consultations {
    pub fn len(&self) -> usize {
        match self {
            Consultations::Physio { all } => all.len(),
            Consultations::Patient { pending, history } => pending.len() + history.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct ConsultationsViewModel {
    repo: Arc<PhysioRepository>,
    clock: Clock,
    state: StateCell<Consultations>,
}

impl ConsultationsViewModel {
    pub fn new(repo: Arc<PhysioRepository>) -> Self {
        Self::with_clock(repo, Arc::new(Utc::now))
    }

    pub fn with_clock(repo: Arc<PhysioRepository>, clock: Clock) -> Self {
        Self {
            repo,
            clock,
            state: StateCell::default(),
        }
    }

    pub fn state(&self) -> &StateCell<Consultations> {
        &self.state
    }

    /// Load consultations for the signed-in role.
    ///
    /// Patients get their own appointments split at the clock's "now";
    /// physios get the ones assigned to them; admins get every appointment.
    pub async fn load(&self) -> Result<Consultations, String> {
        self.state.set(ViewState::Loading);
        let result = self.fetch().await;
        self.state.resolve(result)
    }

    async fn fetch(&self) -> Result<Consultations, String> {
        let session = self.repo.session().current();
        let role = session.role.ok_or_else(|| describe(&RepoError::MissingRole))?;

        match role {
            Role::Patient => {
                let patient_id = session
                    .user_id()
                    .ok_or_else(|| describe(&RepoError::MissingUserId))?;
                let appointments = self
                    .repo
                    .get_my_appointments(patient_id)
                    .await
                    .map_err(|e| describe(&e))?;

                let (pending, history) = partition_by_date(appointments, (self.clock)())
                    .map_err(|e| {
                        warn!(error = %e, "appointment date did not parse");
                        INVALID_DATE.to_string()
                    })?;
                Ok(Consultations::Patient { pending, history })
            }
            Role::Physio => {
                let all = self
                    .repo
                    .get_my_appointments_as_physio()
                    .await
                    .map_err(|e| describe(&e))?;
                Ok(Consultations::Physio { all })
            }
            Role::Admin => {
                let all = self
                    .repo
                    .get_all_appointments()
                    .await
                    .map_err(|e| describe(&e))?;
                Ok(Consultations::Physio { all })
            }
        }
    }
}
