use std::sync::Arc;

use parley_router::CompletionRouter;

use crate::config::Config;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub router: Arc<CompletionRouter>,
}

impl AppState {
    pub fn new(config: Config, router: CompletionRouter) -> Self {
        Self {
            config: Arc::new(config),
            router: Arc::new(router),
        }
    }
}
