// IAM Access Groups: groups, dynamic rules, members, templates.

use iamctl_api::Service;

use super::ops::{ALL, CREATE, CREATE_LIST, DELETE, LIST, PROBE, READ, UPDATE_READ, WRITE};
use super::{ListSpec, PageStyle, Param, ResourceSpec, UpdateMethod};

const TRANSACTION_ID: Param = Param::header("transaction_id", "Transaction-Id", ALL);

pub(super) const SPECS: &[ResourceSpec] = &[
    ResourceSpec {
        name: "iam_access_group",
        service: Service::IamAccessGroups,
        summary: "Access group",
        primary: Some("access_group_id"),
        scope: &[],
        item_path: Some("v2/groups/{access_group_id}"),
        collection_path: "v2/groups",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Patch),
        delete: true,
        precondition: true,
        fixed_query: &[],
        params: &[
            Param::body("name", WRITE),
            Param::body("description", WRITE),
            Param::query("account_id", CREATE_LIST),
            TRANSACTION_ID,
            Param::query("show_federated", READ),
            Param::query("force", DELETE),
            Param::query("iam_id", LIST),
            Param::query("search", LIST),
            Param::query("membership_type", LIST),
            Param::query("sort", LIST),
            Param::query("hide_public_access", LIST),
            Param::query("limit", LIST),
        ],
        list: Some(ListSpec {
            items_key: "groups",
            style: PageStyle::Offset,
        }),
        result_renames: &[],
    },
    ResourceSpec {
        name: "iam_access_group_rule",
        service: Service::IamAccessGroups,
        summary: "Dynamic membership rule of an access group",
        primary: Some("rule_id"),
        scope: &["access_group_id"],
        item_path: Some("v2/groups/{access_group_id}/rules/{rule_id}"),
        collection_path: "v2/groups/{access_group_id}/rules",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Put),
        delete: true,
        precondition: true,
        fixed_query: &[],
        params: &[
            Param::body("name", WRITE),
            Param::body("expiration", WRITE),
            Param::body("realm_name", WRITE),
            Param::body("conditions", WRITE),
            TRANSACTION_ID,
        ],
        list: Some(ListSpec {
            items_key: "rules",
            style: PageStyle::Single,
        }),
        result_renames: &[],
    },
    ResourceSpec {
        name: "iam_access_group_members",
        service: Service::IamAccessGroups,
        summary: "Members of an access group (read-only)",
        primary: None,
        scope: &["access_group_id"],
        item_path: None,
        collection_path: "v2/groups/{access_group_id}/members",
        update_path: None,
        version_path: None,
        create: false,
        update: None,
        delete: false,
        precondition: false,
        fixed_query: &[],
        params: &[
            TRANSACTION_ID,
            Param::query("limit", LIST),
            Param::query("type", LIST),
            Param::query("membership_type", LIST),
            Param::query("verbose", LIST),
            Param::query("sort", LIST),
        ],
        list: Some(ListSpec {
            items_key: "members",
            style: PageStyle::Offset,
        }),
        result_renames: &[],
    },
    ResourceSpec {
        name: "iam_access_group_template",
        service: Service::IamAccessGroups,
        summary: "Access group template (read-only)",
        primary: Some("template_id"),
        scope: &[],
        item_path: Some("v1/group_templates/{template_id}"),
        collection_path: "v1/group_templates",
        update_path: None,
        version_path: None,
        create: false,
        update: None,
        delete: false,
        precondition: false,
        fixed_query: &[],
        params: &[
            Param::query("account_id", LIST),
            TRANSACTION_ID,
            Param::query("limit", LIST),
            Param::query("verbose", READ),
        ],
        list: Some(ListSpec {
            items_key: "group_templates",
            style: PageStyle::Offset,
        }),
        result_renames: &[],
    },
    ResourceSpec {
        name: "iam_access_group_template_version",
        service: Service::IamAccessGroups,
        summary: "Version of an access group template",
        primary: Some("version_num"),
        scope: &["template_id"],
        item_path: Some("v1/group_templates/{template_id}/versions/{version_num}"),
        collection_path: "v1/group_templates/{template_id}/versions",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Put),
        delete: true,
        precondition: true,
        fixed_query: &[],
        params: &[
            Param::body("name", WRITE),
            Param::body("description", WRITE),
            Param::body("group", WRITE),
            Param::body("policy_template_references", WRITE),
            TRANSACTION_ID,
            Param::query("verbose", PROBE),
            Param::query("limit", LIST),
        ],
        list: Some(ListSpec {
            items_key: "group_template_versions",
            style: PageStyle::Offset,
        }),
        result_renames: &[],
    },
    ResourceSpec {
        name: "iam_access_group_template_assignment",
        service: Service::IamAccessGroups,
        summary: "Assignment of an access group template to an account or account group",
        primary: Some("assignment_id"),
        scope: &[],
        item_path: Some("v1/group_assignments/{assignment_id}"),
        collection_path: "v1/group_assignments",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Patch),
        delete: true,
        precondition: true,
        fixed_query: &[],
        params: &[
            Param::body("template_id", CREATE),
            Param::body("template_version", WRITE),
            Param::body("target_type", CREATE),
            Param::body("target", CREATE),
            TRANSACTION_ID,
            Param::query("verbose", UPDATE_READ),
            Param::query("account_id", LIST),
            Param::query("status", LIST),
            Param::query("limit", LIST),
        ],
        list: Some(ListSpec {
            items_key: "assignments",
            style: PageStyle::Offset,
        }),
        result_renames: &[],
    },
];
