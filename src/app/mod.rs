mod event_handler;
mod pipeline;
mod recording;
mod state;

pub use event_handler::handle_backend_event;
pub use state::{AppState, BackendEvent};
