mod profiler;
mod progress;
mod runner;
pub(crate) mod summary;

#[cfg(test)]
mod tests;

pub(crate) use runner::{resolve_target, run_local};
