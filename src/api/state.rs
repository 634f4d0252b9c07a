//! Shared handler state

use crate::service::ClassificationService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClassificationService>,
}

impl AppState {
    pub fn new(service: ClassificationService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
