use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowPulseError {
    /// No snapshot has ever been produced. The read side reports this as
    /// a not-found condition rather than a server error.
    #[error("No snapshot has been produced yet")]
    SnapshotMissing,

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
