// IAM Identity: service IDs, API keys, trusted profiles and their rules and links.

use iamctl_api::Service;

use super::ops::{CREATE, CREATE_LIST, LIST, READ, WRITE};
use super::{ListSpec, PageStyle, Param, ResourceSpec, TokenSource, UpdateMethod};

const PAGETOKEN: PageStyle = PageStyle::Token {
    param: "pagetoken",
    source: TokenSource::NextUrl,
};

pub(super) const SPECS: &[ResourceSpec] = &[
    ResourceSpec {
        name: "iam_service_id",
        service: Service::IamIdentity,
        summary: "Service ID",
        primary: Some("id"),
        scope: &[],
        item_path: Some("v1/serviceids/{id}"),
        collection_path: "v1/serviceids",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Put),
        delete: true,
        precondition: true,
        fixed_query: &[],
        params: &[
            Param::body("account_id", CREATE_LIST),
            Param::body("name", WRITE),
            Param::body("description", WRITE),
            Param::body("unique_instance_crns", WRITE),
            Param::body("apikey", CREATE),
            Param::header("entity_lock", "Entity-Lock", CREATE),
            Param::query("include_history", READ),
            Param::query("include_activity", READ),
            Param::query("pagesize", LIST),
        ],
        list: Some(ListSpec {
            items_key: "serviceids",
            style: PAGETOKEN,
        }),
        result_renames: &[],
    },
    ResourceSpec {
        name: "iam_api_key",
        service: Service::IamIdentity,
        summary: "API key of a user or service ID",
        primary: Some("id"),
        scope: &[],
        item_path: Some("v1/apikeys/{id}"),
        collection_path: "v1/apikeys",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Put),
        delete: true,
        precondition: true,
        fixed_query: &[],
        params: &[
            Param::body("name", WRITE),
            Param::body("iam_id", CREATE),
            Param::body("description", WRITE),
            Param::body("account_id", CREATE),
            Param::body("apikey", CREATE),
            Param::body("store_value", CREATE),
            Param::body("support_sessions", WRITE),
            Param::body("action_when_leaked", WRITE),
            Param::header("entity_lock", "Entity-Lock", CREATE),
            Param::header("entity_disable", "Entity-Disable", CREATE),
            Param::query("include_history", READ),
            Param::query("include_activity", READ),
            Param::query("pagesize", LIST),
        ],
        list: Some(ListSpec {
            items_key: "apikeys",
            style: PAGETOKEN,
        }),
        result_renames: &[],
    },
    ResourceSpec {
        name: "iam_trusted_profile",
        service: Service::IamIdentity,
        summary: "Trusted profile",
        primary: Some("profile_id"),
        scope: &[],
        item_path: Some("v1/profiles/{profile_id}"),
        collection_path: "v1/profiles",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Put),
        delete: true,
        precondition: true,
        fixed_query: &[],
        params: &[
            Param::body("name", WRITE),
            Param::body("account_id", CREATE_LIST),
            Param::body("description", WRITE),
            Param::query("include_activity", READ),
            Param::query("pagesize", LIST),
        ],
        list: Some(ListSpec {
            items_key: "profiles",
            style: PAGETOKEN,
        }),
        result_renames: &[],
    },
    ResourceSpec {
        name: "iam_profile_claim_rule",
        service: Service::IamIdentity,
        summary: "Claim rule of a trusted profile",
        primary: Some("rule_id"),
        scope: &["profile_id"],
        item_path: Some("v1/profiles/{profile_id}/rules/{rule_id}"),
        collection_path: "v1/profiles/{profile_id}/rules",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Put),
        delete: true,
        precondition: true,
        fixed_query: &[],
        params: &[
            Param::body("type", WRITE),
            Param::body("conditions", WRITE),
            Param::body("context", WRITE),
            Param::body("name", WRITE),
            Param::body("realm_name", WRITE),
            Param::body("cr_type", WRITE),
            Param::body("expiration", WRITE),
        ],
        list: Some(ListSpec {
            items_key: "rules",
            style: PageStyle::Single,
        }),
        result_renames: &[],
    },
    ResourceSpec {
        name: "iam_profile_link",
        service: Service::IamIdentity,
        summary: "Compute resource link of a trusted profile (create and delete only)",
        primary: Some("link_id"),
        scope: &["profile_id"],
        item_path: Some("v1/profiles/{profile_id}/links/{link_id}"),
        collection_path: "v1/profiles/{profile_id}/links",
        update_path: None,
        version_path: None,
        create: true,
        update: None,
        delete: true,
        precondition: false,
        fixed_query: &[],
        params: &[
            Param::body("cr_type", CREATE),
            Param::body("link", CREATE),
            Param::body("name", CREATE),
        ],
        list: Some(ListSpec {
            items_key: "links",
            style: PageStyle::Single,
        }),
        result_renames: &[],
    },
];
