//! Static description of every resource the console knows how to browse:
//! filter bar, detail tabs, form fields and destructive actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Orders,
    Plans,
    PromoCodes,
    Notifications,
    Admins,
    Teams,
    Users,
    ResourcePacks,
    TeamMembers,
    Grants,
    Features,
    AuditLogs,
    AdminRoles,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 13] = [
        ResourceKind::Orders,
        ResourceKind::Plans,
        ResourceKind::PromoCodes,
        ResourceKind::Notifications,
        ResourceKind::Admins,
        ResourceKind::Teams,
        ResourceKind::Users,
        ResourceKind::ResourcePacks,
        ResourceKind::TeamMembers,
        ResourceKind::Grants,
        ResourceKind::Features,
        ResourceKind::AuditLogs,
        ResourceKind::AdminRoles,
    ];

    /// Resources that have their own page in the console.
    pub const BROWSABLE: [ResourceKind; 7] = [
        ResourceKind::Orders,
        ResourceKind::Plans,
        ResourceKind::PromoCodes,
        ResourceKind::Notifications,
        ResourceKind::Admins,
        ResourceKind::Teams,
        ResourceKind::Users,
    ];

    /// Path segment used by the gateway.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Orders => "orders",
            ResourceKind::Plans => "plans",
            ResourceKind::PromoCodes => "promo-codes",
            ResourceKind::Notifications => "notifications",
            ResourceKind::Admins => "admins",
            ResourceKind::Teams => "teams",
            ResourceKind::Users => "users",
            ResourceKind::ResourcePacks => "resource-packs",
            ResourceKind::TeamMembers => "team-members",
            ResourceKind::Grants => "grants",
            ResourceKind::Features => "features",
            ResourceKind::AuditLogs => "audit-logs",
            ResourceKind::AdminRoles => "admin-roles",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ResourceKind::Orders => "Orders",
            ResourceKind::Plans => "Plans",
            ResourceKind::PromoCodes => "Promo codes",
            ResourceKind::Notifications => "Notifications",
            ResourceKind::Admins => "Admins",
            ResourceKind::Teams => "Teams",
            ResourceKind::Users => "Users",
            ResourceKind::ResourcePacks => "Resource packs",
            ResourceKind::TeamMembers => "Team members",
            ResourceKind::Grants => "Grants",
            ResourceKind::Features => "Features",
            ResourceKind::AuditLogs => "Audit logs",
            ResourceKind::AdminRoles => "Admin roles",
        }
    }

    pub fn filters(self) -> &'static [FilterSpec] {
        match self {
            ResourceKind::Orders => ORDER_FILTERS,
            ResourceKind::Plans => PLAN_FILTERS,
            ResourceKind::PromoCodes => PROMO_FILTERS,
            ResourceKind::Notifications => NOTIFICATION_FILTERS,
            ResourceKind::Admins => ADMIN_FILTERS,
            ResourceKind::Teams => TEAM_FILTERS,
            ResourceKind::Users => USER_FILTERS,
            _ => KEYWORD_ONLY,
        }
    }

    pub fn filter(self, key: &str) -> Option<&'static FilterSpec> {
        self.filters().iter().find(|f| f.key == key)
    }

    pub fn tabs(self) -> &'static [TabSpec] {
        match self {
            ResourceKind::Orders => ORDER_TABS,
            ResourceKind::Plans => PLAN_TABS,
            ResourceKind::PromoCodes => PROMO_TABS,
            ResourceKind::Admins => ADMIN_TABS,
            ResourceKind::Teams => TEAM_TABS,
            ResourceKind::Users => USER_TABS,
            _ => &[],
        }
    }

    pub fn tab(self, key: &str) -> Option<&'static TabSpec> {
        self.tabs().iter().find(|t| t.key == key)
    }

    pub fn form_fields(self) -> &'static [FieldSpec] {
        match self {
            ResourceKind::Orders => ORDER_FIELDS,
            ResourceKind::Plans => PLAN_FIELDS,
            ResourceKind::PromoCodes => PROMO_FIELDS,
            ResourceKind::Notifications => NOTIFICATION_FIELDS,
            ResourceKind::Admins => ADMIN_FIELDS,
            ResourceKind::Teams => TEAM_FIELDS,
            ResourceKind::Users => USER_FIELDS,
            ResourceKind::TeamMembers => MEMBER_FIELDS,
            ResourceKind::Grants => GRANT_FIELDS,
            _ => &[],
        }
    }

    pub fn destructive_actions(self) -> &'static [DestructiveAction] {
        match self {
            ResourceKind::Orders => &[DestructiveAction::Cancel],
            ResourceKind::Plans
            | ResourceKind::PromoCodes
            | ResourceKind::Notifications
            | ResourceKind::Teams => &[DestructiveAction::Delete],
            ResourceKind::Admins | ResourceKind::Users => {
                &[DestructiveAction::Suspend, DestructiveAction::Delete]
            }
            ResourceKind::TeamMembers | ResourceKind::Grants => &[DestructiveAction::Revoke],
            _ => &[],
        }
    }

    /// Boolean field flipped by the `setStatus` command, if the resource has one.
    pub fn status_toggle(self) -> Option<&'static str> {
        match self {
            ResourceKind::PromoCodes | ResourceKind::Plans => Some("active"),
            ResourceKind::Users | ResourceKind::Admins => Some("enabled"),
            ResourceKind::Features => Some("enabled"),
            _ => None,
        }
    }

    /// Columns shown in list and tab tables.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Orders => &["id", "status", "teamName", "amount", "createdAt"],
            ResourceKind::Plans => &["id", "name", "price", "active"],
            ResourceKind::PromoCodes => &["id", "code", "discount", "active", "expiresAt"],
            ResourceKind::Notifications => &["id", "title", "channel", "createdAt"],
            ResourceKind::Admins => &["id", "name", "email", "roleName", "enabled"],
            ResourceKind::Teams => &["id", "name", "memberCount", "createdAt"],
            ResourceKind::Users => &["id", "name", "email", "enabled"],
            ResourceKind::ResourcePacks => &["id", "name", "description"],
            ResourceKind::TeamMembers => &["id", "userName", "teamName", "role"],
            ResourceKind::Grants => &["id", "packName", "grantedAt"],
            ResourceKind::Features => &["id", "flag", "enabled"],
            ResourceKind::AuditLogs => &["id", "action", "actor", "createdAt"],
            ResourceKind::AdminRoles => &["id", "name"],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase().replace('_', "-");
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown resource {:?}", s))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Keyword,
    Choice(&'static [&'static str]),
    /// Tri-state: unset / true / false.
    Flag,
    Reference(ResourceKind),
    /// Small closed set loaded once per view (e.g. admin roles).
    Lookup(ResourceKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FilterKind,
}

/// A secondary collection shown in a detail tab, fetched as a list of
/// `kind` constrained by `parent_key = <detail id>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TabSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ResourceKind,
    pub parent_key: &'static str,
    pub page_size: u32,
    /// Mutations in this tab change a column of the parent list
    /// (e.g. a team's `memberCount`).
    pub feeds_list: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Choice(&'static [&'static str]),
    Reference(ResourceKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DestructiveAction {
    Delete,
    Cancel,
    Revoke,
    Suspend,
}

impl DestructiveAction {
    pub fn command(self) -> &'static str {
        match self {
            DestructiveAction::Delete => "delete",
            DestructiveAction::Cancel => "cancel",
            DestructiveAction::Revoke => "revoke",
            DestructiveAction::Suspend => "suspend",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DestructiveAction::Delete => "Delete",
            DestructiveAction::Cancel => "Cancel",
            DestructiveAction::Revoke => "Revoke",
            DestructiveAction::Suspend => "Suspend",
        }
    }

    /// Whether the target disappears from collections afterwards.
    pub fn removes_record(self) -> bool {
        matches!(self, DestructiveAction::Delete | DestructiveAction::Revoke)
    }
}

impl FromStr for DestructiveAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "delete" => Ok(DestructiveAction::Delete),
            "cancel" => Ok(DestructiveAction::Cancel),
            "revoke" => Ok(DestructiveAction::Revoke),
            "suspend" => Ok(DestructiveAction::Suspend),
            other => anyhow::bail!("unknown destructive action {:?}", other),
        }
    }
}

pub const KEYWORD_FILTER: &str = "keyword";

const ORDER_STATUSES: &[&str] = &["pending", "paid", "cancelled", "refunded"];
const PLAN_INTERVALS: &[&str] = &["monthly", "yearly"];
const CHANNELS: &[&str] = &["email", "sms", "in-app"];
const MEMBER_ROLES: &[&str] = &["owner", "admin", "member"];

const KEYWORD: FilterSpec = FilterSpec {
    key: KEYWORD_FILTER,
    label: "Keyword",
    kind: FilterKind::Keyword,
};

const KEYWORD_ONLY: &[FilterSpec] = &[KEYWORD];

const ORDER_FILTERS: &[FilterSpec] = &[
    KEYWORD,
    FilterSpec {
        key: "status",
        label: "Status",
        kind: FilterKind::Choice(ORDER_STATUSES),
    },
    FilterSpec {
        key: "teamId",
        label: "Team",
        kind: FilterKind::Reference(ResourceKind::Teams),
    },
    FilterSpec {
        key: "userId",
        label: "User",
        kind: FilterKind::Reference(ResourceKind::Users),
    },
];

const PLAN_FILTERS: &[FilterSpec] = &[
    KEYWORD,
    FilterSpec {
        key: "active",
        label: "Active",
        kind: FilterKind::Flag,
    },
    FilterSpec {
        key: "interval",
        label: "Interval",
        kind: FilterKind::Choice(PLAN_INTERVALS),
    },
];

const PROMO_FILTERS: &[FilterSpec] = &[
    KEYWORD,
    FilterSpec {
        key: "active",
        label: "Active",
        kind: FilterKind::Flag,
    },
    FilterSpec {
        key: "packId",
        label: "Resource pack",
        kind: FilterKind::Reference(ResourceKind::ResourcePacks),
    },
];

const NOTIFICATION_FILTERS: &[FilterSpec] = &[
    KEYWORD,
    FilterSpec {
        key: "channel",
        label: "Channel",
        kind: FilterKind::Choice(CHANNELS),
    },
    FilterSpec {
        key: "teamId",
        label: "Team",
        kind: FilterKind::Reference(ResourceKind::Teams),
    },
];

const ADMIN_FILTERS: &[FilterSpec] = &[
    KEYWORD,
    FilterSpec {
        key: "roleId",
        label: "Role",
        kind: FilterKind::Lookup(ResourceKind::AdminRoles),
    },
    FilterSpec {
        key: "enabled",
        label: "Enabled",
        kind: FilterKind::Flag,
    },
];

const TEAM_FILTERS: &[FilterSpec] = &[
    KEYWORD,
    FilterSpec {
        key: "ownerId",
        label: "Owner",
        kind: FilterKind::Reference(ResourceKind::Users),
    },
];

const USER_FILTERS: &[FilterSpec] = &[
    KEYWORD,
    FilterSpec {
        key: "enabled",
        label: "Enabled",
        kind: FilterKind::Flag,
    },
    FilterSpec {
        key: "teamId",
        label: "Team",
        kind: FilterKind::Reference(ResourceKind::Teams),
    },
];

const LOGS_PAGE_SIZE: u32 = 10;

const ORDER_TABS: &[TabSpec] = &[TabSpec {
    key: "logs",
    label: "Logs",
    kind: ResourceKind::AuditLogs,
    parent_key: "orderId",
    page_size: LOGS_PAGE_SIZE,
    feeds_list: false,
}];

const PLAN_TABS: &[TabSpec] = &[TabSpec {
    key: "orders",
    label: "Orders",
    kind: ResourceKind::Orders,
    parent_key: "planId",
    page_size: 10,
    feeds_list: false,
}];

const PROMO_TABS: &[TabSpec] = &[TabSpec {
    key: "redemptions",
    label: "Redemptions",
    kind: ResourceKind::Orders,
    parent_key: "promoCodeId",
    page_size: 10,
    feeds_list: false,
}];

const ADMIN_TABS: &[TabSpec] = &[TabSpec {
    key: "logs",
    label: "Logs",
    kind: ResourceKind::AuditLogs,
    parent_key: "adminId",
    page_size: LOGS_PAGE_SIZE,
    feeds_list: false,
}];

const TEAM_TABS: &[TabSpec] = &[
    TabSpec {
        key: "members",
        label: "Members",
        kind: ResourceKind::TeamMembers,
        parent_key: "teamId",
        page_size: 10,
        feeds_list: true,
    },
    TabSpec {
        key: "grants",
        label: "Grants",
        kind: ResourceKind::Grants,
        parent_key: "teamId",
        page_size: 10,
        feeds_list: false,
    },
    TabSpec {
        key: "features",
        label: "Features",
        kind: ResourceKind::Features,
        parent_key: "teamId",
        page_size: 20,
        feeds_list: false,
    },
    TabSpec {
        key: "logs",
        label: "Logs",
        kind: ResourceKind::AuditLogs,
        parent_key: "teamId",
        page_size: LOGS_PAGE_SIZE,
        feeds_list: false,
    },
];

const USER_TABS: &[TabSpec] = &[
    TabSpec {
        key: "teams",
        label: "Teams",
        kind: ResourceKind::TeamMembers,
        parent_key: "userId",
        page_size: 10,
        feeds_list: false,
    },
    TabSpec {
        key: "orders",
        label: "Orders",
        kind: ResourceKind::Orders,
        parent_key: "userId",
        page_size: 10,
        feeds_list: false,
    },
    TabSpec {
        key: "logs",
        label: "Logs",
        kind: ResourceKind::AuditLogs,
        parent_key: "userId",
        page_size: LOGS_PAGE_SIZE,
        feeds_list: false,
    },
];

const fn field(
    key: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind,
        required,
    }
}

const ORDER_FIELDS: &[FieldSpec] = &[
    field("teamId", "Team", FieldKind::Reference(ResourceKind::Teams), true),
    field("planId", "Plan", FieldKind::Reference(ResourceKind::Plans), true),
    field("amount", "Amount", FieldKind::Number, true),
    field("status", "Status", FieldKind::Choice(ORDER_STATUSES), false),
];

const PLAN_FIELDS: &[FieldSpec] = &[
    field("name", "Name", FieldKind::Text, true),
    field("price", "Price", FieldKind::Number, true),
    field("interval", "Interval", FieldKind::Choice(PLAN_INTERVALS), true),
];

const PROMO_FIELDS: &[FieldSpec] = &[
    field("code", "Code", FieldKind::Text, true),
    field("discount", "Discount %", FieldKind::Number, true),
    field("packId", "Resource pack", FieldKind::Reference(ResourceKind::ResourcePacks), false),
    field("expiresAt", "Expires at", FieldKind::Text, false),
];

const NOTIFICATION_FIELDS: &[FieldSpec] = &[
    field("title", "Title", FieldKind::Text, true),
    field("body", "Body", FieldKind::Text, true),
    field("channel", "Channel", FieldKind::Choice(CHANNELS), true),
    field("teamId", "Team", FieldKind::Reference(ResourceKind::Teams), false),
];

const ADMIN_FIELDS: &[FieldSpec] = &[
    field("name", "Name", FieldKind::Text, true),
    field("email", "Email", FieldKind::Text, true),
    field("roleId", "Role", FieldKind::Reference(ResourceKind::AdminRoles), true),
];

const TEAM_FIELDS: &[FieldSpec] = &[
    field("name", "Name", FieldKind::Text, true),
    field("ownerId", "Owner", FieldKind::Reference(ResourceKind::Users), true),
];

const USER_FIELDS: &[FieldSpec] = &[
    field("name", "Name", FieldKind::Text, true),
    field("email", "Email", FieldKind::Text, true),
];

const MEMBER_FIELDS: &[FieldSpec] = &[
    field("teamId", "Team", FieldKind::Reference(ResourceKind::Teams), true),
    field("userId", "User", FieldKind::Reference(ResourceKind::Users), true),
    field("role", "Role", FieldKind::Choice(MEMBER_ROLES), false),
];

const GRANT_FIELDS: &[FieldSpec] = &[
    field("teamId", "Team", FieldKind::Reference(ResourceKind::Teams), true),
    field("packId", "Resource pack", FieldKind::Reference(ResourceKind::ResourcePacks), true),
];

#[cfg(test)]
#[path = "../tests/model/catalog_tests.rs"]
mod tests;
