use crate::summary::SummaryService;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SummaryService>,
}

impl AppState {
    pub fn new(service: SummaryService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
