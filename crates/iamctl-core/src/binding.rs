// ── HTTP binding of catalog entries ──
//
// Turns a `ResourceSpec` plus caller parameters into concrete requests for
// the reconciler's probe/create/update/delete operations.

use iamctl_api::{ApiRequest, ApiResponse, Method, ServiceClient};
use serde_json::{Map, Value};
use tracing::debug;

use crate::catalog::{self, Location, Op, ResourceSpec, UpdateMethod};
use crate::error::CoreError;
use crate::reconcile::{
    self, DesiredState, Identity, Intent, Outcome, Precondition, ReconcileRequest, RemoteError,
    ResourceId, ResourceOps, Snapshot,
};

/// Reserved parameter carrying the reconcile intent.
pub const STATE_PARAM: &str = "state";
/// Reserved parameter carrying a caller-supplied precondition.
pub const IF_MATCH_PARAM: &str = "if_match";

// ── Parameter rendering ──────────────────────────────────────────────

/// String form of a parameter for paths, query arguments and headers.
///
/// Lists are comma-joined, objects are sent as JSON, `null` means "unset".
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(render_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

fn has_body(op: Op) -> bool {
    matches!(op, Op::Create | Op::Update)
}

fn method_for(spec: &ResourceSpec, op: Op) -> Method {
    match op {
        Op::Probe | Op::List => Method::GET,
        Op::Create => Method::POST,
        Op::Delete => Method::DELETE,
        Op::Update => match spec.update {
            Some(UpdateMethod::Patch) => Method::PATCH,
            _ => Method::PUT,
        },
    }
}

/// Build the request for one operation of `spec`.
pub(crate) fn build_request(
    spec: &ResourceSpec,
    op: Op,
    identity: &Identity,
    params: &DesiredState,
) -> Result<ApiRequest, RemoteError> {
    let template = spec.path_for(op).ok_or_else(|| {
        RemoteError::invalid_request(format!("{} does not support {op}", spec.name))
    })?;
    build_request_at(spec, op, template, identity, params)
}

/// Build the request for `op` against an explicit path template.
///
/// Path placeholders are filled from the identity first, then from
/// parameters declared with [`Location::Path`].
pub(crate) fn build_request_at(
    spec: &ResourceSpec,
    op: Op,
    template: &str,
    identity: &Identity,
    params: &DesiredState,
) -> Result<ApiRequest, RemoteError> {
    let mut segments = Vec::new();
    for segment in template.split('/').filter(|s| !s.is_empty()) {
        let Some(var) = segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        else {
            segments.push(segment.to_owned());
            continue;
        };

        let value = if spec.primary == Some(var) {
            identity.primary().map(ToString::to_string)
        } else if spec.scope.contains(&var) {
            identity.scope(var).map(str::to_owned)
        } else {
            params.get(var).and_then(render_value)
        };

        match value {
            Some(value) if !value.is_empty() => segments.push(value),
            _ => {
                return Err(RemoteError::invalid_request(format!(
                    "missing required parameter '{var}' for {} {op}",
                    spec.name
                )));
            }
        }
    }

    let mut request = ApiRequest::new(method_for(spec, op), segments);
    let mut body = Map::new();

    for param in spec.params.iter().filter(|p| p.applies_to(op)) {
        let Some(value) = params.get(param.name).filter(|v| !v.is_null()) else {
            continue;
        };
        match param.location {
            Location::Path => {}
            Location::Body if has_body(op) => {
                body.insert(param.wire.to_owned(), value.clone());
            }
            Location::Body | Location::Query => {
                if let Some(rendered) = render_value(value) {
                    request = request.query(param.wire, rendered);
                }
            }
            Location::Header => {
                if let Some(rendered) = render_value(value) {
                    request = request.header(param.wire, rendered);
                }
            }
        }
    }

    for (name, value) in spec.fixed_query {
        if !request.query.iter().any(|(n, _)| n == name) {
            request = request.query(*name, *value);
        }
    }

    if has_body(op) {
        request = request.json(Value::Object(body));
    }

    Ok(request)
}

/// Wrap a response as a snapshot, renaming fields the catalog asks for.
pub(crate) fn to_snapshot(spec: &ResourceSpec, response: ApiResponse) -> Snapshot {
    let mut snapshot = Snapshot::from_body(response.body, response.etag);
    for (from, to) in spec.result_renames {
        if let Some(value) = snapshot.attributes.remove(*from) {
            snapshot.attributes.insert((*to).to_owned(), value);
        }
    }
    snapshot
}

pub(crate) fn tag_service(spec: &ResourceSpec, err: impl Into<RemoteError>) -> RemoteError {
    let mut err = err.into();
    err.service = spec.service.to_string();
    err
}

// ── Parameter validation ─────────────────────────────────────────────

fn validation(message: impl Into<String>) -> CoreError {
    CoreError::ValidationFailed {
        message: message.into(),
    }
}

/// Pull the identity out of `params`: the primary id (optional) and every
/// scope id (required). What remains are ordinary parameters.
pub(crate) fn take_identity(
    spec: &ResourceSpec,
    params: &mut DesiredState,
) -> Result<Identity, CoreError> {
    let primary = match spec.primary {
        Some(name) => params
            .remove(name)
            .as_ref()
            .and_then(render_value)
            .and_then(ResourceId::new),
        None => None,
    };

    let mut identity = Identity::new(primary);
    for name in spec.scope {
        let value = params
            .remove(*name)
            .as_ref()
            .and_then(render_value)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                validation(format!("missing required parameter '{name}' for {}", spec.name))
            })?;
        identity = identity.with_scope(*name, value);
    }
    Ok(identity)
}

/// Reject names the catalog entry does not declare and drop `null`s.
pub(crate) fn check_params(spec: &ResourceSpec, params: DesiredState) -> Result<DesiredState, CoreError> {
    let mut known = Map::new();
    for (name, value) in params {
        if spec.param(&name).is_none() {
            return Err(validation(format!(
                "unknown parameter '{name}' for {}",
                spec.name
            )));
        }
        if !value.is_null() {
            known.insert(name, value);
        }
    }
    Ok(known)
}

fn take_intent(params: &mut DesiredState) -> Result<Intent, CoreError> {
    match params.remove(STATE_PARAM) {
        None | Some(Value::Null) => Ok(Intent::default()),
        Some(Value::String(raw)) => raw.parse().map_err(|_| {
            validation(format!("state must be 'present' or 'absent', got '{raw}'"))
        }),
        Some(other) => Err(validation(format!(
            "state must be 'present' or 'absent', got {other}"
        ))),
    }
}

/// Split caller parameters into a reconcile request for `spec`.
///
/// Everything that can be checked locally is checked here, so a bad
/// invocation fails before the first remote call.
pub fn prepare(spec: &ResourceSpec, mut params: DesiredState) -> Result<ReconcileRequest, CoreError> {
    if !spec.reconcilable() {
        return Err(CoreError::Unsupported {
            resource: spec.name.to_owned(),
            operation: "apply".into(),
        });
    }

    let intent = take_intent(&mut params)?;

    let precondition = match params.remove(IF_MATCH_PARAM) {
        None | Some(Value::Null) => None,
        Some(_) if !spec.precondition => {
            return Err(validation(format!(
                "{} does not accept '{IF_MATCH_PARAM}'",
                spec.name
            )));
        }
        Some(value) => render_value(&value).and_then(Precondition::new),
    };

    let identity = take_identity(spec, &mut params)?;
    let desired = check_params(spec, params)?;

    // Path parameters of the operations this intent can reach.
    let reachable: &[Op] = match (intent, identity.primary().is_some()) {
        (Intent::Present, true) => &[Op::Create, Op::Update],
        (Intent::Present, false) => &[Op::Create],
        (Intent::Absent, _) => &[Op::Delete],
    };
    for op in reachable.iter().copied().filter(|op| spec.path_for(*op).is_some()) {
        for var in catalog::placeholders(spec.path_for(op).unwrap_or_default()) {
            if !spec.is_identity(var) && !desired.contains_key(var) {
                return Err(validation(format!(
                    "missing required parameter '{var}' for {} {op}",
                    spec.name
                )));
            }
        }
    }

    Ok(ReconcileRequest {
        intent,
        identity,
        desired,
        precondition,
    })
}

// ── Bound operations ─────────────────────────────────────────────────

/// A catalog entry bound to a live service client.
pub struct HttpResource<'a> {
    spec: &'static ResourceSpec,
    client: &'a ServiceClient,
    params: &'a DesiredState,
}

impl<'a> HttpResource<'a> {
    /// `params` supplies query and header values for probe and delete,
    /// which receive no desired state from the reconciler.
    pub fn new(
        spec: &'static ResourceSpec,
        client: &'a ServiceClient,
        params: &'a DesiredState,
    ) -> Self {
        Self {
            spec,
            client,
            params,
        }
    }

    async fn call(&self, request: ApiRequest) -> Result<Snapshot, RemoteError> {
        debug!(
            resource = self.spec.name,
            "{} {}",
            request.method,
            request.display_path()
        );
        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| tag_service(self.spec, e))?;
        Ok(to_snapshot(self.spec, response))
    }

    fn request(
        &self,
        op: Op,
        identity: &Identity,
        params: &DesiredState,
    ) -> Result<ApiRequest, RemoteError> {
        build_request(self.spec, op, identity, params).map_err(|e| tag_service(self.spec, e))
    }
}

impl ResourceOps for HttpResource<'_> {
    async fn probe(&self, identity: &Identity) -> Result<Snapshot, RemoteError> {
        let request = self.request(Op::Probe, identity, self.params)?;
        self.call(request).await
    }

    async fn create(
        &self,
        identity: &Identity,
        desired: &DesiredState,
    ) -> Result<Snapshot, RemoteError> {
        let request = self.request(Op::Create, identity, desired)?;
        self.call(request).await
    }

    async fn update(
        &self,
        identity: &Identity,
        precondition: Option<&Precondition>,
        desired: &DesiredState,
    ) -> Result<Snapshot, RemoteError> {
        let mut request = self.request(Op::Update, identity, desired)?;
        if self.spec.precondition {
            if let Some(precondition) = precondition {
                request = request.header("If-Match", precondition.as_str());
            }
        }
        self.call(request).await
    }

    async fn delete(&self, identity: &Identity) -> Result<(), RemoteError> {
        let request = self.request(Op::Delete, identity, self.params)?;
        self.call(request).await.map(|_| ())
    }

    fn supports_update(&self) -> bool {
        self.spec.update.is_some()
    }
}

// ── Facade ───────────────────────────────────────────────────────────

/// Reconcile one resource of type `spec` against `client`.
pub async fn apply(
    client: &ServiceClient,
    spec: &'static ResourceSpec,
    params: DesiredState,
) -> Result<Outcome, CoreError> {
    let request = prepare(spec, params)?;
    let ops = HttpResource::new(spec, client, &request.desired);
    reconcile::reconcile(&ops, &request).await
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::catalog::find;

    fn params(value: Value) -> DesiredState {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn spec(name: &str) -> &'static ResourceSpec {
        find(name).expect("catalog entry")
    }

    #[test]
    fn render_value_flattens_lists() {
        assert_eq!(render_value(&json!(["a", "b", 3])).as_deref(), Some("a,b,3"));
        assert_eq!(render_value(&json!(true)).as_deref(), Some("true"));
        assert_eq!(render_value(&json!({"k": 1})).as_deref(), Some(r#"{"k":1}"#));
        assert_eq!(render_value(&Value::Null), None);
    }

    #[test]
    fn create_places_params_by_location() {
        let spec = spec("iam_access_group");
        let desired = params(json!({
            "name": "ops",
            "description": null,
            "account_id": "acct-1",
            "transaction_id": "tx-1",
            "force": true
        }));
        let request =
            build_request(spec, Op::Create, &Identity::default(), &desired).expect("request");

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.display_path(), "/v2/groups");
        assert_eq!(request.body, Some(json!({ "name": "ops" })));
        assert_eq!(request.query, vec![("account_id".to_owned(), "acct-1".to_owned())]);
        assert_eq!(
            request.headers,
            vec![("Transaction-Id".to_owned(), "tx-1".to_owned())]
        );
    }

    #[test]
    fn update_uses_patch_and_identity_path() {
        let spec = spec("iam_access_group_rule");
        let identity = Identity::new(ResourceId::new("r-1")).with_scope("access_group_id", "g-1");
        let request = build_request(
            spec,
            Op::Update,
            &identity,
            &params(json!({ "name": "rule", "expiration": 12 })),
        )
        .expect("request");

        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.display_path(), "/v2/groups/g-1/rules/r-1");
        assert_eq!(request.body, Some(json!({ "name": "rule", "expiration": 12 })));

        let group = build_request(
            find("iam_access_group").expect("entry"),
            Op::Update,
            &Identity::new(ResourceId::new("g-1")),
            &Map::new(),
        )
        .expect("request");
        assert_eq!(group.method, Method::PATCH);
        assert_eq!(group.body, Some(json!({})));
    }

    #[test]
    fn read_ops_send_body_params_as_query() {
        let spec = spec("iam_service_id");
        let request = build_request(
            spec,
            Op::List,
            &Identity::default(),
            &params(json!({ "account_id": "acct-1", "name": "ignored" })),
        )
        .expect("request");
        assert_eq!(request.query, vec![("account_id".to_owned(), "acct-1".to_owned())]);
        assert!(request.body.is_none());
    }

    #[test]
    fn wire_renames_and_fixed_query_apply() {
        let policy = spec("schematics_policy");
        let request = build_request(
            policy,
            Op::Create,
            &Identity::default(),
            &params(json!({ "schematics_policy_state": { "state": "draft" } })),
        )
        .expect("request");
        assert_eq!(request.body, Some(json!({ "state": { "state": "draft" } })));

        let assignment = spec("iam_policy_assignment");
        let probe = build_request(
            assignment,
            Op::Probe,
            &Identity::new(ResourceId::new("a-1")),
            &Map::new(),
        )
        .expect("request");
        assert_eq!(probe.query, vec![("version".to_owned(), "1.0".to_owned())]);
    }

    #[test]
    fn update_path_override_needs_its_variable() {
        let spec = spec("iam_policy_template");
        let identity = Identity::new(ResourceId::new("pt-1"));

        let err = build_request(spec, Op::Update, &identity, &Map::new()).expect_err("no version");
        assert!(err.message.contains("'version'"), "{}", err.message);

        let request = build_request(spec, Op::Update, &identity, &params(json!({ "version": "2" })))
            .expect("request");
        assert_eq!(request.display_path(), "/v1/policy_templates/pt-1/versions/2");
    }

    #[test]
    fn snapshot_renames_reserved_fields() {
        let snapshot = to_snapshot(
            spec("schematics_policy"),
            ApiResponse {
                status: 200,
                etag: None,
                body: json!({ "id": "p-1", "state": { "state": "live" } }),
            },
        );
        assert_eq!(
            Value::Object(snapshot.attributes),
            json!({ "id": "p-1", "schematics_policy_state": { "state": "live" } })
        );
    }

    // ── prepare ─────────────────────────────────────────────────────

    #[test]
    fn prepare_splits_reserved_identity_and_desired() {
        let request = prepare(
            spec("iam_access_group_rule"),
            params(json!({
                "state": "present",
                "if_match": "W/\"1\"",
                "rule_id": "r-1",
                "access_group_id": "g-1",
                "name": "rule",
                "realm_name": null
            })),
        )
        .expect("valid");

        assert_eq!(request.intent, Intent::Present);
        assert_eq!(request.precondition.as_ref().map(Precondition::as_str), Some("W/\"1\""));
        assert_eq!(request.identity.primary().map(ResourceId::as_str), Some("r-1"));
        assert_eq!(request.identity.scope("access_group_id"), Some("g-1"));
        assert_eq!(Value::Object(request.desired), json!({ "name": "rule" }));
    }

    #[test]
    fn prepare_rejects_bad_input_before_any_call() {
        let err = prepare(spec("iam_access_group"), params(json!({ "nmae": "typo" })))
            .expect_err("unknown name");
        assert!(err.to_string().contains("unknown parameter 'nmae'"));

        let err = prepare(spec("iam_access_group"), params(json!({ "state": "gone" })))
            .expect_err("bad state");
        assert!(err.is_local());

        let err = prepare(spec("iam_access_group_rule"), params(json!({ "name": "r" })))
            .expect_err("missing scope");
        assert!(err.to_string().contains("'access_group_id'"));

        let err = prepare(spec("schematics_agent"), params(json!({ "if_match": "x" })))
            .expect_err("no precondition support");
        assert!(err.to_string().contains("if_match"));

        let err = prepare(
            spec("iam_policy_template"),
            params(json!({ "policy_template_id": "pt-1", "name": "t" })),
        )
        .expect_err("update path needs version");
        assert!(err.to_string().contains("'version'"));
    }

    #[test]
    fn prepare_refuses_info_only_types() {
        let err = prepare(spec("iam_access_group_members"), Map::new()).expect_err("info only");
        assert!(matches!(err, CoreError::Unsupported { .. }));
    }

    #[test]
    fn empty_primary_means_create() {
        let request = prepare(
            spec("iam_trusted_profile"),
            params(json!({ "profile_id": "", "name": "p" })),
        )
        .expect("valid");
        assert!(request.identity.primary().is_none());
    }
}
