// ── Read-only lookups ──
//
// Get one resource by id, or list every resource of a type through the
// pagination collector.

use iamctl_api::{ApiRequest, ServiceClient};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::binding::{self, IF_MATCH_PARAM, STATE_PARAM};
use crate::catalog::{ListSpec, Op, PageStyle, ResourceSpec, TokenSource};
use crate::error::CoreError;
use crate::pagination::{Cursor, Page, collect_pages};
use crate::reconcile::{DesiredState, Identity, RemoteError};

/// Work out the cursor of the page after `current`.
///
/// `received` is the number of items on the page just read; an empty page
/// always ends an offset-paged run.
pub fn next_cursor(style: PageStyle, current: &Cursor, body: &Value, received: usize) -> Option<Cursor> {
    match style {
        PageStyle::Single => None,
        PageStyle::Offset => {
            if received == 0 {
                return None;
            }
            let offset = match current {
                Cursor::Offset(offset) => *offset,
                _ => 0,
            };
            let next = offset.saturating_add(u64::try_from(received).unwrap_or(u64::MAX));
            let total = body.get("total_count").and_then(Value::as_u64)?;
            (next < total).then_some(Cursor::Offset(next))
        }
        PageStyle::Token {
            source: TokenSource::NextStart,
            ..
        } => body
            .pointer("/next/start")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(|s| Cursor::Token(s.to_owned())),
        PageStyle::Token {
            param,
            source: TokenSource::NextUrl,
        } => {
            let next = body.get("next")?;
            let href = next
                .as_str()
                .or_else(|| next.get("href").and_then(Value::as_str))?;
            token_from_href(href, param).map(Cursor::Token)
        }
    }
}

fn token_from_href(href: &str, param: &str) -> Option<String> {
    let url = Url::parse(href)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(href)))
        .ok()?;
    url.query_pairs()
        .find(|(name, _)| name == param)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn list_request(
    spec: &ResourceSpec,
    list: ListSpec,
    identity: &Identity,
    params: &DesiredState,
    cursor: &Cursor,
) -> Result<ApiRequest, RemoteError> {
    let request = binding::build_request(spec, Op::List, identity, params)?;
    Ok(match (list.style, cursor) {
        (PageStyle::Offset, Cursor::Offset(offset)) => request.query("offset", offset.to_string()),
        (PageStyle::Token { param, .. }, Cursor::Token(token)) => request.query(param, token.clone()),
        _ => request,
    })
}

async fn list_all(
    client: &ServiceClient,
    spec: &ResourceSpec,
    list: ListSpec,
    identity: &Identity,
    params: &DesiredState,
) -> Result<Vec<Value>, RemoteError> {
    collect_pages(|cursor| {
        let request = list_request(spec, list, identity, params, &cursor);
        async move {
            let response = client
                .send(request?)
                .await
                .map_err(|e| binding::tag_service(spec, e))?;
            let items = response
                .body
                .get(list.items_key)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let next = next_cursor(list.style, &cursor, &response.body, items.len());
            Ok::<_, RemoteError>(Page { items, next })
        }
    })
    .await
}

/// Validated input of one lookup.
#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub identity: Identity,
    pub params: DesiredState,
}

/// Check lookup parameters against `spec` without touching the network.
pub fn prepare_lookup(spec: &ResourceSpec, mut params: DesiredState) -> Result<LookupRequest, CoreError> {
    for reserved in [STATE_PARAM, IF_MATCH_PARAM] {
        if params.contains_key(reserved) {
            return Err(CoreError::ValidationFailed {
                message: format!("'{reserved}' is not accepted by info lookups"),
            });
        }
    }

    let identity = binding::take_identity(spec, &mut params)?;
    let params = binding::check_params(spec, params)?;

    let by_id = identity.primary().is_some() && spec.item_path.is_some();
    if !by_id && spec.list.is_none() {
        return Err(unlistable(spec));
    }
    Ok(LookupRequest { identity, params })
}

fn unlistable(spec: &ResourceSpec) -> CoreError {
    CoreError::Unsupported {
        resource: spec.name.to_owned(),
        operation: "list (pass the id to look up one resource)".into(),
    }
}

/// Look up resources of type `spec`.
///
/// With the primary id set, the result is the resource itself plus its
/// `etag`, read at the pinned version when one is given; otherwise it is
/// `{ <items_key>: [...] }` over every page.
pub async fn info(
    client: &ServiceClient,
    spec: &'static ResourceSpec,
    params: DesiredState,
) -> Result<Value, CoreError> {
    let LookupRequest { identity, params } = prepare_lookup(spec, params)?;

    let lookup = spec.lookup_path(|var| params.contains_key(var));
    if let Some(template) = lookup.filter(|_| identity.primary().is_some()) {
        let request = binding::build_request_at(spec, Op::Probe, template, &identity, &params)
            .map_err(|e| binding::tag_service(spec, e))?;
        let response = client
            .send(request)
            .await
            .map_err(|e| binding::tag_service(spec, e))?;
        let snapshot = binding::to_snapshot(spec, response);

        let mut doc = snapshot.attributes;
        if let Some(etag) = snapshot.precondition {
            doc.insert("etag".into(), Value::String(etag.to_string()));
        }
        return Ok(Value::Object(doc));
    }

    let Some(list) = spec.list else {
        return Err(unlistable(spec));
    };

    let items = list_all(client, spec, list, &identity, &params).await?;
    debug!(resource = spec.name, count = items.len(), "listed");

    let mut doc = Map::new();
    doc.insert(list.items_key.to_owned(), Value::Array(items));
    Ok(Value::Object(doc))
}
