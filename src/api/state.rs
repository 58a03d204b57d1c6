use std::sync::Arc;

use crate::application::{MessagingGateway, QaService};
use crate::infrastructure::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub qa_service: Arc<QaService>,
    pub gateway: Arc<MessagingGateway>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(qa_service: Arc<QaService>, gateway: Arc<MessagingGateway>, config: AppConfig) -> Self {
        Self {
            qa_service,
            gateway,
            config: Arc::new(config),
        }
    }
}
