use std::sync::Arc;

use services::{AuthService, BlockService, PageService};

use crate::metrics::Metrics;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub pages: Arc<PageService>,
    pub blocks: Arc<BlockService>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(auth: AuthService, pages: PageService, blocks: BlockService) -> Self {
        Self {
            auth: Arc::new(auth),
            pages: Arc::new(pages),
            blocks: Arc::new(blocks),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
