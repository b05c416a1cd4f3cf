// IAM Policy Management: access policies, custom roles, policy templates
// and their assignments.

use iamctl_api::Service;

use super::ops::{ALL, CREATE, CREATE_LIST, LIST, PROBE_UPDATE, READ, UPDATE_LIST, WRITE};
use super::{ListSpec, PageStyle, Param, ResourceSpec, TokenSource, UpdateMethod};

const START: PageStyle = PageStyle::Token {
    param: "start",
    source: TokenSource::NextStart,
};

const ACCEPT_LANGUAGE: Param = Param::header("accept_language", "Accept-Language", WRITE);

pub(super) const SPECS: &[ResourceSpec] = &[
    ResourceSpec {
        name: "iam_policy",
        service: Service::IamPolicyManagement,
        summary: "Access policy (v1)",
        primary: Some("policy_id"),
        scope: &[],
        item_path: Some("v1/policies/{policy_id}"),
        collection_path: "v1/policies",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Put),
        delete: true,
        precondition: true,
        fixed_query: &[],
        params: &[
            Param::body("type", WRITE),
            Param::body("subjects", WRITE),
            Param::body("roles", WRITE),
            Param::body("resources", WRITE),
            Param::body("description", WRITE),
            ACCEPT_LANGUAGE,
            Param::query("account_id", LIST),
            Param::query("iam_id", LIST),
            Param::query("access_group_id", LIST),
            Param::query("service_type", LIST),
            Param::query("limit", LIST),
        ],
        list: Some(ListSpec {
            items_key: "policies",
            style: START,
        }),
        result_renames: &[],
    },
    ResourceSpec {
        name: "iam_v2_policy",
        service: Service::IamPolicyManagement,
        summary: "Access policy (v2, rule based)",
        primary: Some("id"),
        scope: &[],
        item_path: Some("v2/policies/{id}"),
        collection_path: "v2/policies",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Put),
        delete: true,
        precondition: true,
        fixed_query: &[],
        params: &[
            Param::body("control", WRITE),
            Param::body("type", WRITE),
            Param::body("description", WRITE),
            Param::body("subject", WRITE),
            Param::body("resource", WRITE),
            Param::body("pattern", WRITE),
            Param::body("rule", WRITE),
            ACCEPT_LANGUAGE,
            Param::query("format", READ),
            Param::query("account_id", LIST),
            Param::query("iam_id", LIST),
            Param::query("access_group_id", LIST),
            Param::query("limit", LIST),
        ],
        list: Some(ListSpec {
            items_key: "policies",
            style: START,
        }),
        result_renames: &[],
    },
    ResourceSpec {
        name: "iam_role",
        service: Service::IamPolicyManagement,
        summary: "Custom role",
        primary: Some("role_id"),
        scope: &[],
        item_path: Some("v2/roles/{role_id}"),
        collection_path: "v2/roles",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Put),
        delete: true,
        precondition: true,
        fixed_query: &[],
        params: &[
            Param::body("display_name", WRITE),
            Param::body("actions", WRITE),
            Param::body("name", CREATE),
            Param::body("account_id", CREATE_LIST),
            Param::body("service_name", CREATE_LIST),
            Param::body("description", WRITE),
            ACCEPT_LANGUAGE,
        ],
        list: Some(ListSpec {
            items_key: "custom_roles",
            style: PageStyle::Single,
        }),
        result_renames: &[],
    },
    ResourceSpec {
        name: "iam_policy_template",
        service: Service::IamPolicyManagement,
        summary: "Policy template",
        primary: Some("policy_template_id"),
        scope: &[],
        item_path: Some("v1/policy_templates/{policy_template_id}"),
        collection_path: "v1/policy_templates",
        update_path: Some("v1/policy_templates/{policy_template_id}/versions/{version}"),
        version_path: Some("v1/policy_templates/{policy_template_id}/versions/{version}"),
        create: true,
        update: Some(UpdateMethod::Put),
        delete: true,
        precondition: true,
        fixed_query: &[],
        params: &[
            Param::body("name", WRITE),
            Param::body("account_id", CREATE_LIST),
            Param::body("policy", WRITE),
            Param::body("description", WRITE),
            Param::body("committed", WRITE),
            ACCEPT_LANGUAGE,
            Param::path("version", PROBE_UPDATE),
            Param::query("iam_service_policy_template_state", READ).on_wire("state"),
        ],
        list: Some(ListSpec {
            items_key: "policy_templates",
            style: START,
        }),
        result_renames: &[("state", "iam_service_policy_template_state")],
    },
    ResourceSpec {
        name: "iam_policy_assignment",
        service: Service::IamPolicyManagement,
        summary: "Assignment of policy templates to an account",
        primary: Some("assignment_id"),
        scope: &[],
        item_path: Some("v1/policy_assignments/{assignment_id}"),
        collection_path: "v1/policy_assignments",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Patch),
        delete: true,
        precondition: true,
        fixed_query: &[("version", "1.0")],
        params: &[
            Param::query("version", ALL),
            Param::body("target", CREATE),
            Param::body("options", CREATE),
            Param::body("templates", CREATE),
            Param::body("template_version", UPDATE_LIST),
            Param::header("accept_language", "Accept-Language", CREATE_LIST),
            Param::query("account_id", LIST),
            Param::query("template_id", LIST),
        ],
        list: Some(ListSpec {
            items_key: "assignments",
            style: START,
        }),
        result_renames: &[("status", "iam_service_policy_assignment_status")],
    },
];
