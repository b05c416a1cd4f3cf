// ── Idempotent one-shot reconciliation ──
//
// Probe, then at most one write. The probe is skipped when no identifier
// was supplied; a caller who omits the id always takes the create path,
// even if a like-named resource already exists remotely. Nothing here
// looks resources up by name.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};
use tracing::{debug, info};

use crate::error::CoreError;

/// Caller-supplied desired attributes, keyed by parameter name.
///
/// Never merged with remote state: updates replace with exactly these values.
pub type DesiredState = Map<String, Value>;

// ── Intent ───────────────────────────────────────────────────────────

/// What the caller wants: the resource to exist, or not.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Intent {
    #[default]
    Present,
    Absent,
}

// ── Identity ─────────────────────────────────────────────────────────

/// A non-empty resource identifier.
///
/// An empty string carries the same meaning as "not supplied".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The parameters naming one remote resource instance.
///
/// `primary` is the resource's own id; `scope` holds parent ids such as
/// the access group a rule belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    primary: Option<ResourceId>,
    scope: BTreeMap<String, String>,
}

impl Identity {
    pub fn new(primary: Option<ResourceId>) -> Self {
        Self {
            primary,
            scope: BTreeMap::new(),
        }
    }

    pub fn with_scope(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.scope.insert(name.into(), value.into());
        self
    }

    pub fn primary(&self) -> Option<&ResourceId> {
        self.primary.as_ref()
    }

    pub fn scope(&self, name: &str) -> Option<&str> {
        self.scope.get(name).map(String::as_str)
    }
}

// ── Precondition / snapshot ──────────────────────────────────────────

/// Opaque version token (ETag). Forwarded verbatim, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Precondition(String);

impl Precondition {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote state returned by a successful read or write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub attributes: Map<String, Value>,
    pub precondition: Option<Precondition>,
}

impl Snapshot {
    /// Wrap a response body. Objects are taken as-is, an empty body yields
    /// no attributes, and any other JSON value lands under `result`.
    pub fn from_body(body: Value, etag: Option<String>) -> Self {
        let attributes = match body {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("result".into(), other);
                map
            }
        };
        Self {
            attributes,
            precondition: etag.and_then(Precondition::new),
        }
    }
}

// ── Remote errors ────────────────────────────────────────────────────

/// Classification of a failed bound operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The service answered with this non-2xx status.
    Status(u16),
    Authentication,
    Connection,
    Timeout,
    /// The request could not be built from the supplied parameters.
    InvalidRequest,
    Other,
}

/// Error returned by a bound remote operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub code: Option<String>,
    pub message: String,
    pub service: String,
}

impl RemoteError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::Status(status),
            code: None,
            message: message.into(),
            service: String::new(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::InvalidRequest,
            code: None,
            message: message.into(),
            service: String::new(),
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self.kind {
            RemoteErrorKind::Status(status) => Some(status),
            _ => None,
        }
    }

    /// Only a 404 counts as "does not exist".
    pub fn is_not_found(&self) -> bool {
        self.http_status() == Some(404)
    }
}

impl From<iamctl_api::Error> for RemoteError {
    fn from(err: iamctl_api::Error) -> Self {
        use iamctl_api::Error as ApiError;

        let (kind, code, message) = match err {
            ApiError::Api {
                status,
                message,
                code,
                trace: _,
            } => (RemoteErrorKind::Status(status), code, message),
            ApiError::Authentication { message } => (RemoteErrorKind::Authentication, None, message),
            ApiError::Transport(ref e) if e.is_timeout() => {
                (RemoteErrorKind::Timeout, None, err.to_string())
            }
            ApiError::Transport(ref e) if e.is_connect() => {
                (RemoteErrorKind::Connection, None, err.to_string())
            }
            ApiError::Transport(_) => match err.status() {
                Some(status) => (RemoteErrorKind::Status(status), None, err.to_string()),
                None => (RemoteErrorKind::Connection, None, err.to_string()),
            },
            ApiError::Tls(_) => (RemoteErrorKind::Connection, None, err.to_string()),
            ApiError::InvalidUrl(_) | ApiError::InvalidEndpoint(_) | ApiError::InvalidHeader { .. } => {
                (RemoteErrorKind::InvalidRequest, None, err.to_string())
            }
            ApiError::Deserialization { .. } => (RemoteErrorKind::Other, None, err.to_string()),
        };

        Self {
            kind,
            code,
            message,
            service: String::new(),
        }
    }
}

// ── Bound operations ─────────────────────────────────────────────────

/// The four remote operations a resource type is bound to.
pub trait ResourceOps {
    /// Read the resource named by `identity`. A 404 means "absent".
    fn probe(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = Result<Snapshot, RemoteError>> + Send;

    fn create(
        &self,
        identity: &Identity,
        desired: &DesiredState,
    ) -> impl Future<Output = Result<Snapshot, RemoteError>> + Send;

    /// Full replace with `desired`, guarded by `precondition` when present.
    fn update(
        &self,
        identity: &Identity,
        precondition: Option<&Precondition>,
        desired: &DesiredState,
    ) -> impl Future<Output = Result<Snapshot, RemoteError>> + Send;

    fn delete(&self, identity: &Identity) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Some resource types (profile links) can only be created or deleted.
    fn supports_update(&self) -> bool {
        true
    }
}

// ── Request / outcome ────────────────────────────────────────────────

/// Everything one reconciliation needs besides the bound operations.
#[derive(Debug, Clone, Default)]
pub struct ReconcileRequest {
    pub intent: Intent,
    pub identity: Identity,
    pub desired: DesiredState,
    /// Caller-supplied token; takes priority over the one the probe returns.
    pub precondition: Option<Precondition>,
}

/// Why nothing was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum UnchangedReason {
    /// `absent` requested and the resource does not exist.
    NotFound,
    /// `present` requested, the resource exists, and the type has no update.
    #[strum(serialize = "exists")]
    UpdateUnsupported,
}

/// Result of one successful reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created {
        attributes: Map<String, Value>,
        precondition: Option<Precondition>,
    },
    Updated {
        attributes: Map<String, Value>,
        precondition: Option<Precondition>,
    },
    Deleted {
        id: ResourceId,
    },
    Unchanged {
        id: Option<ResourceId>,
        reason: UnchangedReason,
    },
}

impl Outcome {
    /// Whether a remote mutation happened.
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Unchanged { .. })
    }

    /// The result document: `changed` plus either the
    /// returned attributes (and `etag`) or `id` + `status`.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        match self {
            Self::Created {
                attributes,
                precondition,
            }
            | Self::Updated {
                attributes,
                precondition,
            } => {
                doc.extend(attributes.clone());
                if let Some(etag) = precondition {
                    doc.insert("etag".into(), Value::String(etag.to_string()));
                }
            }
            Self::Deleted { id } => {
                doc.insert("id".into(), Value::String(id.to_string()));
                doc.insert("status".into(), Value::String("deleted".into()));
            }
            Self::Unchanged { id, reason } => {
                doc.insert(
                    "id".into(),
                    id.as_ref()
                        .map_or(Value::Null, |id| Value::String(id.to_string())),
                );
                doc.insert("status".into(), Value::String(reason.to_string()));
            }
        }
        doc.insert("changed".into(), Value::Bool(self.changed()));
        Value::Object(doc)
    }
}

// ── The reconciler ───────────────────────────────────────────────────

/// Drive one remote resource toward `request.intent`.
///
/// Performs at most one probe followed by at most one write. A probe 404
/// selects the create (or no-op delete) branch; every other error aborts
/// before any write is attempted.
pub async fn reconcile<O: ResourceOps>(
    ops: &O,
    request: &ReconcileRequest,
) -> Result<Outcome, CoreError> {
    let identity = &request.identity;

    let existing = match identity.primary() {
        Some(id) => match ops.probe(identity).await {
            Ok(snapshot) => {
                debug!(%id, "probe: resource exists");
                Some((id.clone(), snapshot))
            }
            Err(err) if err.is_not_found() => {
                debug!(%id, "probe: resource not found");
                None
            }
            Err(err) => {
                debug!(%id, error = %err, "probe failed");
                return Err(err.into());
            }
        },
        None => {
            debug!("no identifier supplied, assuming the resource does not exist");
            None
        }
    };

    match (request.intent, existing) {
        (Intent::Absent, Some((id, _))) => {
            info!(%id, "deleting");
            ops.delete(identity).await?;
            Ok(Outcome::Deleted { id })
        }
        (Intent::Absent, None) => Ok(Outcome::Unchanged {
            id: identity.primary().cloned(),
            reason: UnchangedReason::NotFound,
        }),
        (Intent::Present, None) => {
            info!("creating");
            let snapshot = ops.create(identity, &request.desired).await?;
            Ok(Outcome::Created {
                attributes: snapshot.attributes,
                precondition: snapshot.precondition,
            })
        }
        (Intent::Present, Some((id, current))) => {
            if !ops.supports_update() {
                debug!(%id, "resource exists and cannot be updated");
                return Ok(Outcome::Unchanged {
                    id: Some(id),
                    reason: UnchangedReason::UpdateUnsupported,
                });
            }

            let precondition = request
                .precondition
                .as_ref()
                .or(current.precondition.as_ref());
            info!(%id, guarded = precondition.is_some(), "updating");
            let snapshot = ops
                .update(identity, precondition, &request.desired)
                .await?;
            Ok(Outcome::Updated {
                attributes: snapshot.attributes,
                precondition: snapshot.precondition,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    // ── Counting fake ───────────────────────────────────────────────

    #[derive(Default)]
    struct FakeOps {
        probe_result: Option<Result<Snapshot, RemoteError>>,
        write_error: Option<RemoteError>,
        updatable: bool,
        probes: AtomicUsize,
        creates: AtomicUsize,
        updates: AtomicUsize,
        deletes: AtomicUsize,
        seen_precondition: Mutex<Option<String>>,
        seen_desired: Mutex<Option<DesiredState>>,
    }

    impl FakeOps {
        fn new() -> Self {
            Self {
                updatable: true,
                ..Self::default()
            }
        }

        fn exists(mut self, etag: Option<&str>) -> Self {
            self.probe_result = Some(Ok(Snapshot::from_body(
                json!({ "id": "res-1", "name": "remote" }),
                etag.map(str::to_owned),
            )));
            self
        }

        fn probe_fails(mut self, status: u16, message: &str) -> Self {
            self.probe_result = Some(Err(RemoteError::status(status, message)));
            self
        }

        fn writes_fail(mut self, status: u16, message: &str) -> Self {
            self.write_error = Some(RemoteError::status(status, message));
            self
        }

        fn without_update(mut self) -> Self {
            self.updatable = false;
            self
        }

        fn writes(&self) -> usize {
            self.creates.load(Ordering::SeqCst)
                + self.updates.load(Ordering::SeqCst)
                + self.deletes.load(Ordering::SeqCst)
        }

        fn write_result(&self, body: Value) -> Result<Snapshot, RemoteError> {
            match &self.write_error {
                Some(err) => Err(err.clone()),
                None => Ok(Snapshot::from_body(body, Some("W/\"new\"".into()))),
            }
        }
    }

    impl ResourceOps for FakeOps {
        async fn probe(&self, _identity: &Identity) -> Result<Snapshot, RemoteError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.probe_result
                .clone()
                .unwrap_or_else(|| Err(RemoteError::status(404, "not found")))
        }

        async fn create(
            &self,
            _identity: &Identity,
            desired: &DesiredState,
        ) -> Result<Snapshot, RemoteError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            *self.seen_desired.lock().expect("lock") = Some(desired.clone());
            let mut body = desired.clone();
            body.insert("id".into(), json!("res-new"));
            self.write_result(Value::Object(body))
        }

        async fn update(
            &self,
            _identity: &Identity,
            precondition: Option<&Precondition>,
            desired: &DesiredState,
        ) -> Result<Snapshot, RemoteError> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            *self.seen_precondition.lock().expect("lock") = precondition.map(ToString::to_string);
            *self.seen_desired.lock().expect("lock") = Some(desired.clone());
            let mut body = desired.clone();
            body.insert("id".into(), json!("res-1"));
            self.write_result(Value::Object(body))
        }

        async fn delete(&self, _identity: &Identity) -> Result<(), RemoteError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            match &self.write_error {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn supports_update(&self) -> bool {
            self.updatable
        }
    }

    fn desired() -> DesiredState {
        let mut map = Map::new();
        map.insert("name".into(), json!("ops-team"));
        map.insert("description".into(), json!("operators"));
        map
    }

    fn request(intent: Intent, id: Option<&str>) -> ReconcileRequest {
        ReconcileRequest {
            intent,
            identity: Identity::new(id.and_then(ResourceId::new)),
            desired: desired(),
            precondition: None,
        }
    }

    // ── Branches ────────────────────────────────────────────────────

    #[tokio::test]
    async fn no_id_skips_probe_and_creates() {
        let ops = FakeOps::new();
        let outcome = reconcile(&ops, &request(Intent::Present, None))
            .await
            .expect("create succeeds");

        assert_eq!(ops.probes.load(Ordering::SeqCst), 0);
        assert_eq!(ops.creates.load(Ordering::SeqCst), 1);
        assert_eq!(ops.writes(), 1);
        assert_eq!(*ops.seen_desired.lock().expect("lock"), Some(desired()));

        let doc = outcome.to_document();
        assert_eq!(doc["changed"], json!(true));
        assert_eq!(doc["id"], json!("res-new"));
        assert_eq!(doc["name"], json!("ops-team"));
        assert_eq!(doc["description"], json!("operators"));
        assert_eq!(doc["etag"], json!("W/\"new\""));
    }

    #[tokio::test]
    async fn empty_id_counts_as_absent() {
        let ops = FakeOps::new().exists(None);
        let outcome = reconcile(&ops, &request(Intent::Present, Some("  ")))
            .await
            .expect("create succeeds");

        assert_eq!(ops.probes.load(Ordering::SeqCst), 0);
        assert!(matches!(outcome, Outcome::Created { .. }));
    }

    #[tokio::test]
    async fn existing_resource_is_updated_with_probe_etag() {
        let ops = FakeOps::new().exists(Some("W/\"v1\""));
        let outcome = reconcile(&ops, &request(Intent::Present, Some("res-1")))
            .await
            .expect("update succeeds");

        assert_eq!(ops.probes.load(Ordering::SeqCst), 1);
        assert_eq!(ops.updates.load(Ordering::SeqCst), 1);
        assert_eq!(ops.creates.load(Ordering::SeqCst), 0);
        assert_eq!(
            ops.seen_precondition.lock().expect("lock").as_deref(),
            Some("W/\"v1\"")
        );
        assert!(outcome.changed());
        assert!(matches!(outcome, Outcome::Updated { .. }));
    }

    #[tokio::test]
    async fn caller_precondition_wins_over_probe_etag() {
        let ops = FakeOps::new().exists(Some("W/\"v1\""));
        let mut req = request(Intent::Present, Some("res-1"));
        req.precondition = Precondition::new("W/\"caller\"");

        reconcile(&ops, &req).await.expect("update succeeds");

        assert_eq!(
            ops.seen_precondition.lock().expect("lock").as_deref(),
            Some("W/\"caller\"")
        );
    }

    #[tokio::test]
    async fn absent_on_missing_resource_is_noop() {
        let ops = FakeOps::new();
        let outcome = reconcile(&ops, &request(Intent::Absent, Some("res-1")))
            .await
            .expect("no-op succeeds");

        assert_eq!(ops.deletes.load(Ordering::SeqCst), 0);
        assert_eq!(ops.writes(), 0);
        assert_eq!(
            outcome.to_document(),
            json!({ "changed": false, "id": "res-1", "status": "not_found" })
        );
    }

    #[tokio::test]
    async fn absent_is_idempotent() {
        let ops = FakeOps::new();
        for _ in 0..3 {
            let outcome = reconcile(&ops, &request(Intent::Absent, Some("res-1")))
                .await
                .expect("no-op succeeds");
            assert!(!outcome.changed());
            assert_eq!(outcome.to_document()["status"], json!("not_found"));
        }
        assert_eq!(ops.writes(), 0);
    }

    #[tokio::test]
    async fn absent_without_id_reports_null_id() {
        let ops = FakeOps::new();
        let outcome = reconcile(&ops, &request(Intent::Absent, None))
            .await
            .expect("no-op succeeds");
        assert_eq!(ops.probes.load(Ordering::SeqCst), 0);
        assert_eq!(
            outcome.to_document(),
            json!({ "changed": false, "id": null, "status": "not_found" })
        );
    }

    #[tokio::test]
    async fn existing_resource_is_deleted() {
        let ops = FakeOps::new().exists(None);
        let outcome = reconcile(&ops, &request(Intent::Absent, Some("res-1")))
            .await
            .expect("delete succeeds");

        assert_eq!(ops.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(ops.writes(), 1);
        assert_eq!(
            outcome.to_document(),
            json!({ "changed": true, "id": "res-1", "status": "deleted" })
        );
    }

    #[tokio::test]
    async fn probe_server_error_aborts_without_writes() {
        for intent in [Intent::Present, Intent::Absent] {
            let ops = FakeOps::new().probe_fails(500, "Something went wrong...");
            let err = reconcile(&ops, &request(intent, Some("res-1")))
                .await
                .expect_err("probe failure is fatal");

            assert_eq!(err.to_string(), "Something went wrong...");
            assert_eq!(err.status(), Some(500));
            assert_eq!(ops.probes.load(Ordering::SeqCst), 1);
            assert_eq!(ops.writes(), 0);
        }
    }

    #[tokio::test]
    async fn probe_not_found_creates_and_never_updates() {
        let ops = FakeOps::new().probe_fails(404, "gone");
        let outcome = reconcile(&ops, &request(Intent::Present, Some("res-1")))
            .await
            .expect("create succeeds");

        assert_eq!(ops.creates.load(Ordering::SeqCst), 1);
        assert_eq!(ops.updates.load(Ordering::SeqCst), 0);
        assert!(matches!(outcome, Outcome::Created { .. }));
    }

    #[tokio::test]
    async fn write_failures_pass_the_message_through() {
        let ops = FakeOps::new().writes_fail(400, "Create error");
        let err = reconcile(&ops, &request(Intent::Present, None))
            .await
            .expect_err("create fails");
        assert_eq!(err.to_string(), "Create error");
        assert_eq!(ops.creates.load(Ordering::SeqCst), 1);

        let ops = FakeOps::new().exists(None).writes_fail(409, "Delete error");
        let err = reconcile(&ops, &request(Intent::Absent, Some("res-1")))
            .await
            .expect_err("delete fails");
        assert_eq!(err.to_string(), "Delete error");
        assert_eq!(ops.writes(), 1);
    }

    #[tokio::test]
    async fn existing_resource_without_update_is_left_alone() {
        let ops = FakeOps::new().exists(None).without_update();
        let outcome = reconcile(&ops, &request(Intent::Present, Some("res-1")))
            .await
            .expect("no-op succeeds");

        assert_eq!(ops.writes(), 0);
        assert_eq!(
            outcome.to_document(),
            json!({ "changed": false, "id": "res-1", "status": "exists" })
        );
    }

    // ── Value types ─────────────────────────────────────────────────

    #[test]
    fn intent_parses_case_insensitively() {
        assert_eq!("present".parse::<Intent>().ok(), Some(Intent::Present));
        assert_eq!("ABSENT".parse::<Intent>().ok(), Some(Intent::Absent));
        assert!("gone".parse::<Intent>().is_err());
        assert_eq!(Intent::default(), Intent::Present);
    }

    #[test]
    fn snapshot_wraps_non_object_bodies() {
        let snap = Snapshot::from_body(json!(["a"]), Some(String::new()));
        assert_eq!(snap.attributes.get("result"), Some(&json!(["a"])));
        assert!(snap.precondition.is_none());

        assert!(Snapshot::from_body(Value::Null, None).attributes.is_empty());
    }

    #[test]
    fn created_document_keeps_changed_authoritative() {
        let mut attributes = Map::new();
        attributes.insert("changed".into(), json!("remote field"));
        let outcome = Outcome::Created {
            attributes,
            precondition: None,
        };
        assert_eq!(outcome.to_document(), json!({ "changed": true }));
    }
}
