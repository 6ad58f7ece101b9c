use std::sync::Arc;

use calendar_core::CalendarService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CalendarService>,
}
