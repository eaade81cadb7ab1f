//! Application state.

use std::sync::Arc;

use mathscribe_core::calculator::gemini::ExpressionModel;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn ExpressionModel>,
}

impl AppState {
    pub fn new(model: Arc<dyn ExpressionModel>) -> Self {
        Self { model }
    }
}
