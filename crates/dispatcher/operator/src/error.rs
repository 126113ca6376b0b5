//! The taxonomy of `spec.md` §7, surfaced at the `Ctx::reconcile` boundary.
//!
//! Internal components report failures as `anyhow::Error`; this enum is the
//! seam where they're classified before being handed back to the framework
//! as a [`kube::Error`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// API conflicts, rate-limits, not-ready watchers.
    #[error("transient error: {0}")]
    Transient(#[source] anyhow::Error),

    /// Parse/evaluate errors inside the structural templater (4.B).
    #[error("template expansion failed: {0}")]
    TemplateExpansion(#[source] anyhow::Error),

    /// The named job template does not exist.
    #[error("job template {name:?} not found: {source}")]
    Reference {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<ReconcileError> for kube::Error {
    fn from(error: ReconcileError) -> Self {
        kube::Error::Service(Box::new(error))
    }
}
