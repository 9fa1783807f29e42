use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Value, json};

pub(super) fn load_seed(path: Option<&Path>) -> Result<Value> {
    let Some(path) = path else {
        return Ok(builtin_seed());
    };
    let bytes = std::fs::read(path).with_context(|| format!("read seed {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse seed {}", path.display()))
}

/// Small, cross-referenced data set covering every resource.
pub(super) fn builtin_seed() -> Value {
    json!({
        "admin-roles": [
            { "id": 1, "name": "Owner" },
            { "id": 2, "name": "Support" },
            { "id": 3, "name": "Finance" }
        ],
        "admins": [
            { "id": 10, "name": "Ada Admin", "email": "ada@backoffice.test", "roleId": 1, "enabled": true },
            { "id": 11, "name": "Sam Support", "email": "sam@backoffice.test", "roleId": 2, "enabled": true },
            { "id": 12, "name": "Fin Ledger", "email": "fin@backoffice.test", "roleId": 3, "enabled": false }
        ],
        "users": [
            { "id": 100, "name": "Alice Example", "email": "alice@example.com", "enabled": true, "createdAt": "2026-01-04T09:00:00Z" },
            { "id": 101, "name": "Bob Builder", "email": "bob@example.com", "enabled": true, "createdAt": "2026-01-11T12:30:00Z" },
            { "id": 102, "name": "Carol Chen", "email": "carol@example.com", "enabled": false, "createdAt": "2026-02-02T08:15:00Z" },
            { "id": 103, "name": "Dan Dover", "email": "dan@example.com", "enabled": true, "createdAt": "2026-02-20T17:45:00Z" }
        ],
        "teams": [
            { "id": 200, "name": "Acme", "ownerId": 100, "createdAt": "2026-01-05T10:00:00Z" },
            { "id": 201, "name": "Globex", "ownerId": 101, "createdAt": "2026-01-12T10:00:00Z" },
            { "id": 202, "name": "Initech", "ownerId": 103, "createdAt": "2026-03-01T10:00:00Z" }
        ],
        "team-members": [
            { "id": 300, "teamId": 200, "userId": 100, "role": "owner" },
            { "id": 301, "teamId": 200, "userId": 102, "role": "member" },
            { "id": 302, "teamId": 201, "userId": 101, "role": "owner" },
            { "id": 303, "teamId": 201, "userId": 100, "role": "admin" },
            { "id": 304, "teamId": 202, "userId": 103, "role": "owner" }
        ],
        "resource-packs": [
            { "id": 400, "name": "Starter pack", "description": "Templates for new teams" },
            { "id": 401, "name": "Analytics pack", "description": "Dashboards and reports" }
        ],
        "grants": [
            { "id": 410, "teamId": 200, "packId": 400, "grantedAt": "2026-01-06T09:00:00Z" },
            { "id": 411, "teamId": 201, "packId": 401, "grantedAt": "2026-02-01T09:00:00Z" }
        ],
        "features": [
            { "id": 420, "teamId": 200, "flag": "beta-editor", "enabled": true },
            { "id": 421, "teamId": 200, "flag": "sso", "enabled": false },
            { "id": 422, "teamId": 201, "flag": "sso", "enabled": true }
        ],
        "plans": [
            { "id": 500, "name": "Basic", "price": 9, "interval": "monthly", "active": true },
            { "id": 501, "name": "Pro", "price": 29, "interval": "monthly", "active": true },
            { "id": 502, "name": "Pro Annual", "price": 290, "interval": "yearly", "active": false }
        ],
        "promo-codes": [
            { "id": 600, "code": "WELCOME10", "discount": 10, "packId": 400, "active": true, "expiresAt": "2026-12-31T23:59:59Z" },
            { "id": 601, "code": "SPRING25", "discount": 25, "active": false, "expiresAt": "2026-05-31T23:59:59Z" }
        ],
        "orders": [
            { "id": 700, "teamId": 200, "userId": 100, "planId": 501, "promoCodeId": 600, "amount": 26.1, "status": "paid", "createdAt": "2026-01-07T11:00:00Z" },
            { "id": 701, "teamId": 201, "userId": 101, "planId": 500, "amount": 9, "status": "pending", "createdAt": "2026-02-03T14:20:00Z" },
            { "id": 702, "teamId": 200, "userId": 102, "planId": 502, "amount": 290, "status": "refunded", "createdAt": "2026-02-14T09:10:00Z" },
            { "id": 703, "teamId": 202, "userId": 103, "planId": 501, "amount": 29, "status": "paid", "createdAt": "2026-03-02T16:40:00Z" }
        ],
        "notifications": [
            { "id": 800, "title": "Scheduled maintenance", "body": "Saturday 02:00 UTC", "channel": "email", "createdAt": "2026-03-10T08:00:00Z" },
            { "id": 801, "title": "Invoice ready", "body": "Your February invoice is available", "channel": "in-app", "teamId": 201, "createdAt": "2026-03-01T07:00:00Z" }
        ],
        "audit-logs": [
            { "id": 900, "action": "order.paid", "actor": "system", "orderId": 700, "teamId": 200, "userId": 100, "createdAt": "2026-01-07T11:00:05Z" },
            { "id": 901, "action": "order.refunded", "actor": "Fin Ledger", "orderId": 702, "teamId": 200, "adminId": 12, "createdAt": "2026-02-15T10:00:00Z" },
            { "id": 902, "action": "team.created", "actor": "Alice Example", "teamId": 200, "userId": 100, "createdAt": "2026-01-05T10:00:00Z" },
            { "id": 903, "action": "admin.login", "actor": "Ada Admin", "adminId": 10, "createdAt": "2026-03-12T09:00:00Z" }
        ]
    })
}
