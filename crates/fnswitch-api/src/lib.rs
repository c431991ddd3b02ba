pub mod app;
pub mod error;
pub mod handlers;
pub mod state;

pub use app::build_app;
pub use handlers::invocation_response;
pub use state::AppState;
