use crate::service::MarketService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MarketService>,
}

impl AppState {
    pub fn new(service: MarketService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
