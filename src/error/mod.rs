mod app;
mod config;
mod fetch;
mod http;
mod metrics;
mod service;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use fetch::FetchError;
pub use http::HttpError;
pub use metrics::MetricsError;
pub use service::ServiceError;
pub use validation::ValidationError;
