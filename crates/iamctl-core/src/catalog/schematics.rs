// Schematics: agents, policies and workspaces.

use iamctl_api::Service;

use super::ops::{CREATE, DELETE, LIST, PROBE, READ, WRITE};
use super::{ListSpec, PageStyle, Param, ResourceSpec, UpdateMethod};

pub(super) const SPECS: &[ResourceSpec] = &[
    ResourceSpec {
        name: "schematics_agent",
        service: Service::Schematics,
        summary: "Schematics agent registration",
        primary: Some("agent_id"),
        scope: &[],
        item_path: Some("v2/agents/{agent_id}"),
        collection_path: "v2/agents",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Put),
        delete: true,
        precondition: false,
        fixed_query: &[],
        params: &[
            Param::body("name", WRITE),
            Param::body("resource_group", WRITE),
            Param::body("version", WRITE),
            Param::body("schematics_location", WRITE),
            Param::body("agent_location", WRITE),
            Param::body("description", WRITE),
            Param::body("tags", WRITE),
            Param::body("agent_metadata", WRITE),
            Param::body("agent_inputs", WRITE),
            Param::body("user_state", WRITE),
            Param::body("agent_kpi", WRITE),
            Param::query("profile", READ),
            Param::query("force", DELETE),
            Param::query("limit", LIST),
        ],
        list: Some(ListSpec {
            items_key: "agents",
            style: PageStyle::Offset,
        }),
        result_renames: &[],
    },
    ResourceSpec {
        name: "schematics_policy",
        service: Service::Schematics,
        summary: "Schematics agent assignment policy",
        primary: Some("policy_id"),
        scope: &[],
        item_path: Some("v2/settings/policies/{policy_id}"),
        collection_path: "v2/settings/policies",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Patch),
        delete: true,
        precondition: false,
        fixed_query: &[],
        params: &[
            Param::body("name", WRITE),
            Param::body("description", WRITE),
            Param::body("resource_group", WRITE),
            Param::body("tags", WRITE),
            Param::body("location", WRITE),
            Param::body("schematics_policy_state", WRITE).on_wire("state"),
            Param::body("kind", WRITE),
            Param::body("target", WRITE),
            Param::body("parameter", WRITE),
            Param::body("scoped_resources", WRITE),
            Param::query("profile", READ),
            Param::query("policy_kind", LIST),
            Param::query("limit", LIST),
        ],
        list: Some(ListSpec {
            items_key: "policies",
            style: PageStyle::Offset,
        }),
        result_renames: &[("state", "schematics_policy_state")],
    },
    ResourceSpec {
        name: "schematics_workspace",
        service: Service::Schematics,
        summary: "Schematics workspace",
        primary: Some("w_id"),
        scope: &[],
        item_path: Some("v1/workspaces/{w_id}"),
        collection_path: "v1/workspaces",
        update_path: None,
        version_path: None,
        create: true,
        update: Some(UpdateMethod::Put),
        delete: true,
        precondition: false,
        fixed_query: &[],
        params: &[
            Param::body("name", WRITE),
            Param::body("description", WRITE),
            Param::body("location", WRITE),
            Param::body("resource_group", WRITE),
            Param::body("tags", WRITE),
            Param::body("type", WRITE),
            Param::body("template_data", WRITE),
            Param::body("template_ref", WRITE),
            Param::body("template_repo", WRITE),
            Param::body("workspace_status", WRITE),
            Param::body("shared_data", WRITE),
            Param::body("applied_shareddata_ids", CREATE),
            Param::body("catalog_ref", WRITE),
            Param::body("agent_id", WRITE),
            Param::body("dependencies", WRITE),
            Param::header("x_github_token", "X-Github-token", CREATE),
            Param::header("refresh_token", "refresh_token", DELETE),
            Param::query("destroy_resources", DELETE),
            Param::query("profile", PROBE),
            Param::query("limit", LIST),
        ],
        list: Some(ListSpec {
            items_key: "workspaces",
            style: PageStyle::Offset,
        }),
        result_renames: &[],
    },
];
