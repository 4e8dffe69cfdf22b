//! Appointment detail screen.

use std::sync::Arc;

use super::{describe, StateCell, ViewState};
use crate::models::AppointmentFlat;
use crate::repository::PhysioRepository;

/// Confirmation of a deleted appointment.
#[derive(Debug, Clone, PartialEq)]
pub struct Deleted {
    pub appointment_id: String,
    /// Backend confirmation, when one was sent
    pub message: Option<String>,
}

/// Shows one appointment and lets staff delete it.
pub struct AppointmentDetailViewModel {
    repo: Arc<PhysioRepository>,
    appointment: AppointmentFlat,
    state: StateCell<Deleted>,
}

impl AppointmentDetailViewModel {
    pub fn new(repo: Arc<PhysioRepository>, appointment: AppointmentFlat) -> Self {
        Self {
            repo,
            appointment,
            state: StateCell::default(),
        }
    }

    pub fn appointment(&self) -> &AppointmentFlat {
        &self.appointment
    }

    /// Assigned physio, for navigating to their detail screen.
    pub fn physio_id(&self) -> Option<&str> {
        self.appointment.physio_id.as_deref()
    }

    pub fn state(&self) -> &StateCell<Deleted> {
        &self.state
    }

    pub async fn delete(&self) -> Result<Deleted, String> {
        self.state.set(ViewState::Loading);
        let appointment_id = self.appointment.id.clone();
        let result = self
            .repo
            .delete_appointment(&appointment_id)
            .await
            .map(|message| Deleted {
                appointment_id,
                message,
            })
            .map_err(|e| describe(&e));
        self.state.resolve(result)
    }
}
