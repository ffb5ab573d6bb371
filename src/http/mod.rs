//! HTTP client construction, the single-request fetcher and the bounded dispatcher.
mod client;
mod dispatcher;
mod fetcher;


pub use client::{ClientSettings, build_client};
pub use dispatcher::{DispatchCounters, DispatchPlan, OutcomeStream, dispatch};
pub use fetcher::{FetchRequest, Fetcher, HttpFetcher};
