//! Shared error types for the core.

/// Errors surfaced by the computational core.
///
/// Most failure modes in this crate are *not* errors: degenerate sampling
/// weights degrade to unweighted sampling (with a [`log::warn!`] diagnostic),
/// and unsplittable columns are reported as plain data so the caller can try
/// another column. The only condition that unwinds is cooperative
/// cancellation.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A user-requested interrupt was observed at a cancellation checkpoint.
    #[error("procedure was interrupted")]
    Interrupted,
}
