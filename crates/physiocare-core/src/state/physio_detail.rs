//! Physio detail screen.

use std::sync::Arc;

use super::{describe, StateCell, ViewState};
use crate::models::PhysioItem;
use crate::repository::PhysioRepository;

pub struct PhysioDetailViewModel {
    repo: Arc<PhysioRepository>,
    state: StateCell<PhysioItem>,
}

impl PhysioDetailViewModel {
    pub fn new(repo: Arc<PhysioRepository>) -> Self {
        Self {
            repo,
            state: StateCell::default(),
        }
    }

    pub fn state(&self) -> &StateCell<PhysioItem> {
        &self.state
    }

    pub async fn load(&self, physio_id: &str) -> Result<PhysioItem, String> {
        self.state.set(ViewState::Loading);
        let result = self
            .repo
            .get_physio(physio_id)
            .await
            .map_err(|e| describe(&e));
        self.state.resolve(result)
    }
}
