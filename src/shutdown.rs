use tokio::sync::broadcast;

/// Tells background observers (progress bar, debug endpoint) the run is over.
pub type ShutdownSender = broadcast::Sender<()>;
