pub(crate) const DEFAULT_USER_AGENT: &str = concat!("thrash/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_REQUESTS: &str = "100";
pub(crate) const DEFAULT_CONCURRENCY: &str = "1";
pub(crate) const DEFAULT_TIMEOUT: &str = "60s";
pub(crate) const DEFAULT_BUCKETS: &str = "5";
pub(crate) const DEFAULT_PROFILE_ADDR: &str = "127.0.0.1:6060";
