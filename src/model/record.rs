use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::EntityId;

/// Anything the browser can address by id.
pub trait Entity {
    fn entity_id(&self) -> Option<EntityId>;
}

/// Entities that can stand in for a foreign key in a picker.
pub trait Referenceable: Entity {
    fn to_option(&self) -> Option<ReferenceOption>;
}

/// Entities that accept a partial update coming back from a mutation.
pub trait Patchable {
    fn merge_fields(&mut self, fields: &Map<String, Value>);
}

/// Human readable stand-in for a foreign id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceOption {
    pub id: EntityId,
    pub display_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_label: Option<String>,
}

const LABEL_KEYS: &[&str] = &["name", "title", "code", "email", "action"];
const SECONDARY_KEYS: &[&str] = &["email", "description", "status"];
const AVATAR_KEYS: &[&str] = &["avatarUrl", "logoUrl"];

/// Untyped row as returned by the gateway. Every resource is browsable
/// through this type; typed structs exist only where code needs fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn id(&self) -> Option<EntityId> {
        self.reference("id")
    }

    /// Reads an id-valued field, accepting numbers and numeric strings.
    pub fn reference(&self, key: &str) -> Option<EntityId> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_u64().map(EntityId),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Display rendering of one field; missing and null render empty.
    pub fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Bool(b)) => if *b { "yes" } else { "no" }.to_string(),
            Some(other) => other.to_string(),
        }
    }

    pub fn label(&self) -> String {
        first_text(self, LABEL_KEYS)
            .or_else(|| self.id().map(|id| format!("#{}", id)))
            .unwrap_or_default()
    }
}

fn first_text(record: &Record, keys: &[&str]) -> Option<String> {
    keys.iter()
        .map(|k| record.text(k))
        .find(|s| !s.trim().is_empty())
}

impl Entity for Record {
    fn entity_id(&self) -> Option<EntityId> {
        self.id()
    }
}

impl Referenceable for Record {
    fn to_option(&self) -> Option<ReferenceOption> {
        let id = self.id()?;
        let display_label = self.label();
        let secondary_label =
            first_text(self, SECONDARY_KEYS).filter(|s| *s != display_label);
        Some(ReferenceOption {
            id,
            display_label,
            avatar_url: first_text(self, AVATAR_KEYS),
            secondary_label,
        })
    }
}

impl Patchable for Record {
    fn merge_fields(&mut self, fields: &Map<String, Value>) {
        for (k, v) in fields {
            self.0.insert(k.clone(), v.clone());
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(m: Map<String, Value>) -> Self {
        Record(m)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub member_count: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePack {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRole {
    pub id: EntityId,
    pub name: String,
}

impl Entity for Team {
    fn entity_id(&self) -> Option<EntityId> {
        Some(self.id)
    }
}

impl Referenceable for Team {
    fn to_option(&self) -> Option<ReferenceOption> {
        Some(ReferenceOption {
            id: self.id,
            display_label: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            secondary_label: Some(format!("{} members", self.member_count)),
        })
    }
}

impl Entity for User {
    fn entity_id(&self) -> Option<EntityId> {
        Some(self.id)
    }
}

impl Referenceable for User {
    fn to_option(&self) -> Option<ReferenceOption> {
        Some(ReferenceOption {
            id: self.id,
            display_label: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            secondary_label: self.email.clone(),
        })
    }
}

impl Entity for ResourcePack {
    fn entity_id(&self) -> Option<EntityId> {
        Some(self.id)
    }
}

impl Referenceable for ResourcePack {
    fn to_option(&self) -> Option<ReferenceOption> {
        Some(ReferenceOption {
            id: self.id,
            display_label: self.name.clone(),
            avatar_url: None,
            secondary_label: self.description.clone(),
        })
    }
}

impl Entity for AdminRole {
    fn entity_id(&self) -> Option<EntityId> {
        Some(self.id)
    }
}

impl Referenceable for AdminRole {
    fn to_option(&self) -> Option<ReferenceOption> {
        Some(ReferenceOption {
            id: self.id,
            display_label: self.name.clone(),
            avatar_url: None,
            secondary_label: None,
        })
    }
}

#[cfg(test)]
#[path = "../tests/model/record_tests.rs"]
mod tests;
