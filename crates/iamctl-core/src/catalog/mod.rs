// ── Resource catalog ──
//
// One static entry per resource type. An entry says where the resource
// lives, which of the four reconcile operations it binds, how each caller
// parameter reaches the wire, and how its list endpoint pages.

mod access_groups;
mod identity;
mod policy;
mod schematics;

use iamctl_api::Service;
use strum::{Display, EnumIter};

/// A remote operation a parameter can be sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Op {
    Probe,
    Create,
    Update,
    Delete,
    List,
}

/// Common operation sets for [`Param::ops`].
pub mod ops {
    use super::Op;

    pub const ALL: &[Op] = &[Op::Probe, Op::Create, Op::Update, Op::Delete, Op::List];
    pub const WRITE: &[Op] = &[Op::Create, Op::Update];
    pub const CREATE: &[Op] = &[Op::Create];
    pub const UPDATE: &[Op] = &[Op::Update];
    pub const DELETE: &[Op] = &[Op::Delete];
    pub const PROBE: &[Op] = &[Op::Probe];
    pub const PROBE_UPDATE: &[Op] = &[Op::Probe, Op::Update];
    pub const LIST: &[Op] = &[Op::List];
    pub const READ: &[Op] = &[Op::Probe, Op::List];
    pub const CREATE_LIST: &[Op] = &[Op::Create, Op::List];
    pub const UPDATE_READ: &[Op] = &[Op::Probe, Op::Update, Op::List];
    pub const UPDATE_LIST: &[Op] = &[Op::Update, Op::List];
}

/// Where a parameter is placed in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Location {
    /// Fills a `{name}` placeholder of a path template.
    Path,
    /// JSON body key. Operations without a body (probe, list, delete)
    /// send it as a query argument instead.
    Body,
    Query,
    Header,
}

/// One caller-facing parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    /// Name the caller uses (`-P name=value`).
    pub name: &'static str,
    /// Name on the wire: JSON key, query argument or header.
    pub wire: &'static str,
    pub location: Location,
    pub ops: &'static [Op],
}

impl Param {
    pub const fn body(name: &'static str, ops: &'static [Op]) -> Self {
        Self {
            name,
            wire: name,
            location: Location::Body,
            ops,
        }
    }

    pub const fn query(name: &'static str, ops: &'static [Op]) -> Self {
        Self {
            name,
            wire: name,
            location: Location::Query,
            ops,
        }
    }

    pub const fn header(name: &'static str, wire: &'static str, ops: &'static [Op]) -> Self {
        Self {
            name,
            wire,
            location: Location::Header,
            ops,
        }
    }

    pub const fn path(name: &'static str, ops: &'static [Op]) -> Self {
        Self {
            name,
            wire: name,
            location: Location::Path,
            ops,
        }
    }

    /// Send under a different wire name, e.g. `schematics_policy_state`
    /// travels as `state` so it cannot clash with the reconcile intent.
    pub const fn on_wire(self, wire: &'static str) -> Self {
        Self { wire, ..self }
    }

    pub fn applies_to(&self, op: Op) -> bool {
        self.ops.contains(&op)
    }
}

/// HTTP method of the update call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum UpdateMethod {
    Put,
    Patch,
}

/// Where a token-paged list keeps its continuation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// `{"next": {"start": "..."}}` (policy management).
    NextStart,
    /// A query argument of the `next` link, given either as a string or
    /// as `{"next": {"href": "..."}}` (IAM identity).
    NextUrl,
}

/// How a list endpoint pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStyle {
    /// Everything comes back in one response.
    Single,
    /// `offset` / `limit` query arguments with a `total_count` in the body.
    Offset,
    /// Continuation token sent back as query argument `param`.
    Token {
        param: &'static str,
        source: TokenSource,
    },
}

/// List endpoint description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSpec {
    /// Key of the item array in each page, also the key of the info result.
    pub items_key: &'static str,
    pub style: PageStyle,
}

/// Static description of one resource type.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec {
    pub name: &'static str,
    pub service: Service,
    pub summary: &'static str,
    /// Parameter carrying the resource's own id, if it has one.
    pub primary: Option<&'static str>,
    /// Parent identifiers, always required.
    pub scope: &'static [&'static str],
    /// Path of one instance (probe, update, delete).
    pub item_path: Option<&'static str>,
    /// Path of the collection (create, list).
    pub collection_path: &'static str,
    /// Update path when it differs from `item_path`.
    pub update_path: Option<&'static str>,
    /// Path of one pinned version. Lookups by id use it instead of
    /// `item_path` once every placeholder it names is supplied.
    pub version_path: Option<&'static str>,
    pub create: bool,
    pub update: Option<UpdateMethod>,
    pub delete: bool,
    /// Updates carry an `If-Match` precondition.
    pub precondition: bool,
    /// Query arguments sent with every request unless the caller overrides them.
    pub fixed_query: &'static [(&'static str, &'static str)],
    pub params: &'static [Param],
    pub list: Option<ListSpec>,
    /// Response keys renamed before they are reported (`state` would
    /// otherwise shadow the reconcile intent).
    pub result_renames: &'static [(&'static str, &'static str)],
}

impl ResourceSpec {
    /// Whether `apply` can drive this type at all.
    pub fn reconcilable(&self) -> bool {
        self.primary.is_some() && self.item_path.is_some() && (self.create || self.delete)
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Whether `name` is an identifier of this type (primary or scope).
    pub fn is_identity(&self, name: &str) -> bool {
        self.primary == Some(name) || self.scope.contains(&name)
    }

    /// Path template of `op`, if the type binds it.
    pub fn path_for(&self, op: Op) -> Option<&'static str> {
        match op {
            Op::Create if self.create => Some(self.collection_path),
            Op::List if self.list.is_some() => Some(self.collection_path),
            Op::Probe => self.item_path,
            Op::Delete if self.delete => self.item_path,
            Op::Update if self.update.is_some() => self.update_path.or(self.item_path),
            _ => None,
        }
    }

    /// Path template of a lookup by id. `supplied` tells whether a
    /// non-identity placeholder has a value.
    pub fn lookup_path(&self, supplied: impl Fn(&str) -> bool) -> Option<&'static str> {
        self.version_path
            .filter(|path| placeholders(path).all(|var| self.is_identity(var) || supplied(var)))
            .or(self.item_path)
    }

    /// Operations this type binds.
    pub fn operations(&self) -> Vec<Op> {
        use strum::IntoEnumIterator;
        Op::iter().filter(|op| self.path_for(*op).is_some()).collect()
    }
}

/// Every resource type `iamctl` knows about.
pub fn catalog() -> impl Iterator<Item = &'static ResourceSpec> {
    access_groups::SPECS
        .iter()
        .chain(identity::SPECS)
        .chain(policy::SPECS)
        .chain(schematics::SPECS)
}

/// Look up a resource type by name.
pub fn find(name: &str) -> Option<&'static ResourceSpec> {
    catalog().find(|spec| spec.name == name)
}

/// Placeholder names of a path template, in order.
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    template.split('/').filter_map(|segment| {
        segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
    })
}
