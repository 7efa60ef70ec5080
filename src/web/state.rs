//! Shared state for the HTTP trigger surface.

use std::sync::Arc;

use crate::orchestration::{Clock, RunCoordinator};
use crate::report::ReportPaths;

/// Handed to every handler; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<RunCoordinator>,
    /// Same naming rules as the scheduled runs, minus the base directory
    pub paths: ReportPaths,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(coordinator: Arc<RunCoordinator>, paths: ReportPaths, clock: Arc<dyn Clock>) -> Self {
        Self {
            coordinator,
            paths,
            clock,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("coordinator", &self.coordinator)
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}
