//! GitHub App webhook that requires every pull request to reference at least
//! one open issue in its repository, reported as a commit status.

pub mod app_state;
pub mod config;
pub mod error;
pub mod event;
pub mod github;
pub mod routes;
pub mod secrets;
pub mod signature;

pub use app_state::{build_app_state, AppState};
pub use config::Config;
pub use routes::router;
