use std::sync::Arc;

use crate::backend::StorefrontBackend;
use crate::reconciler::PollSettings;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn StorefrontBackend>,
    pub settings: PollSettings,
}

impl AppState {
    pub fn new(backend: Arc<dyn StorefrontBackend>, settings: PollSettings) -> Self {
        Self { backend, settings }
    }
}
