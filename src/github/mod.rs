pub mod auth;
pub mod client;
pub mod issues;
pub mod jwt;
pub mod models;
pub mod statuses;

pub use auth::AppAuthenticator;
pub use client::GitHubClient;
pub use statuses::StatusReporter;
