// iamctl-core: Idempotent reconciliation and lookups over the IBM Cloud resource catalog.

pub mod binding;
pub mod catalog;
pub mod error;
pub mod info;
pub mod pagination;
pub mod reconcile;

// ── Primary re-exports ──────────────────────────────────────────────
pub use binding::{HttpResource, apply, prepare};
pub use catalog::{Op, ResourceSpec, catalog, find};
pub use error::CoreError;
pub use info::{LookupRequest, info, prepare_lookup};
pub use pagination::{Cursor, Page, collect_pages};
pub use reconcile::{
    DesiredState, Identity, Intent, Outcome, Precondition, ReconcileRequest, RemoteError,
    RemoteErrorKind, ResourceId, ResourceOps, Snapshot, UnchangedReason, reconcile,
};
