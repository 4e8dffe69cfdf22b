//! Patient list screen.

use std::sync::Arc;

use super::{describe, StateCell, ViewState};
use crate::models::{PatientItem, Role};
use crate::repository::{PhysioRepository, RepoError, RepoResult};

/// Lists patients. A signed-in patient only ever sees their own profile.
pub struct PatientsViewModel {
    repo: Arc<PhysioRepository>,
    state: StateCell<Vec<PatientItem>>,
}

impl PatientsViewModel {
    pub fn new(repo: Arc<PhysioRepository>) -> Self {
        Self {
            repo,
            state: StateCell::default(),
        }
    }

    pub fn state(&self) -> &StateCell<Vec<PatientItem>> {
        &self.state
    }

    pub async fn load(&self) -> Result<Vec<PatientItem>, String> {
        self.state.set(ViewState::Loading);
        let result = self.fetch().await.map_err(|e| describe(&e));
        self.state.resolve(result)
    }

    /// Search by name and surname. Blank filters are dropped; with no
    /// filters left this is a plain [`PatientsViewModel::load`].
    pub async fn search(&self, name: &str, surname: &str) -> Result<Vec<PatientItem>, String> {
        let name = Some(name.trim()).filter(|n| !n.is_empty());
        let surname = Some(surname.trim()).filter(|s| !s.is_empty());
        if name.is_none() && surname.is_none() {
            return self.load().await;
        }

        self.state.set(ViewState::Loading);
        let result = self
            .repo
            .find_patients(name, surname)
            .await
            .map_err(|e| describe(&e));
        self.state.resolve(result)
    }

    async fn fetch(&self) -> RepoResult<Vec<PatientItem>> {
        let session = self.repo.session().current();
        match session.role {
            Some(Role::Patient) => {
                let own_id = session.user_id().ok_or(RepoError::MissingUserId)?;
                let patient = self.repo.get_patient(own_id).await?;
                Ok(vec![patient])
            }
            Some(Role::Physio) | Some(Role::Admin) => self.repo.get_all_patients().await,
            None => Err(RepoError::MissingRole),
        }
    }
}
