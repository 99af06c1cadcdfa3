use std::sync::Arc;

use crate::{
    config::Settings,
    database::repository::Store,
    shopping::render::{DocumentBackend, PdfBackend},
};

/// Shared by every handler; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub settings: Arc<Settings>,
    pub renderer: Arc<dyn DocumentBackend>,
}

impl AppState {
    pub fn new<S>(store: S, settings: Settings) -> Self
    where
        S: Store + 'static,
    {
        Self {
            store: Arc::new(store),
            settings: Arc::new(settings),
            renderer: Arc::new(PdfBackend),
        }
    }

    pub fn with_renderer<R>(mut self, renderer: R) -> Self
    where
        R: DocumentBackend + 'static,
    {
        self.renderer = Arc::new(renderer);
        self
    }
}
