use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use crate::browser::{DialogMode, FieldError, FormModel, ReferenceOwner};
use crate::gateway::MutationCommand;
use crate::model::{EntityId, FieldKind, FieldSpec, Record, ResourceKind};

/// Create/edit form driven by the catalog's field list for one resource.
/// Values are kept as typed-in text and converted when the command is
/// built.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct RecordForm {
    kind: ResourceKind,
    fields: &'static [FieldSpec],
    values: BTreeMap<&'static str, String>,
    /// Display labels for reference fields resolved through a picker.
    labels: BTreeMap<&'static str, String>,
    /// Fields fixed by the context (e.g. the team an invite goes to).
    locked: BTreeMap<&'static str, String>,
}

impl RecordForm {
    pub(super) fn blank(kind: ResourceKind) -> Self {
        Self {
            kind,
            fields: kind.form_fields(),
            values: BTreeMap::new(),
            labels: BTreeMap::new(),
            locked: BTreeMap::new(),
        }
    }

    /// Pins a field to a value the user cannot edit.
    pub(super) fn with_locked(mut self, key: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        self.values.insert(key, value.clone());
        self.locked.insert(key, value);
        self
    }

    pub(super) fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Fields the user edits, in catalog order.
    pub(super) fn editable(&self) -> Vec<&'static FieldSpec> {
        self.fields
            .iter()
            .filter(|f| !self.locked.contains_key(f.key))
            .collect()
    }

    pub(super) fn value(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// What a field shows: the picker label for references, else the raw text.
    pub(super) fn display(&self, key: &str) -> String {
        match self.labels.get(key) {
            Some(label) => format!("{} (#{})", label, self.value(key)),
            None => self.value(key).to_string(),
        }
    }

    pub(super) fn set_value(&mut self, key: &'static str, value: impl Into<String>) {
        if self.locked.contains_key(key) {
            return;
        }
        self.labels.remove(key);
        self.values.insert(key, value.into());
    }

    pub(super) fn set_label(&mut self, key: &'static str, label: impl Into<String>) {
        self.labels.insert(key, label.into());
    }

    /// Steps a choice field through its options (and back to empty).
    pub(super) fn cycle_choice(&mut self, key: &'static str, forward: bool) {
        let Some(FieldKind::Choice(options)) = self.spec(key).map(|f| f.kind) else {
            return;
        };
        let current = options.iter().position(|o| *o == self.value(key));
        let len = options.len() + 1;
        let pos = current.map(|i| i + 1).unwrap_or(0);
        let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
        let value = if next == 0 { String::new() } else { options[next - 1].to_string() };
        self.set_value(key, value);
    }

    fn spec(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}

impl FormModel for RecordForm {
    type Entity = Record;

    fn hydrate(&mut self, entity: &Record) {
        for field in self.fields {
            if self.locked.contains_key(field.key) {
                continue;
            }
            self.values.insert(field.key, entity.text(field.key));
            if let FieldKind::Reference(_) = field.kind
                && let Some(base) = field.key.strip_suffix("Id")
            {
                let label = entity.text(&format!("{base}Name"));
                if !label.is_empty() {
                    self.labels.insert(field.key, label);
                }
            }
        }
    }

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errs = Vec::new();
        for field in self.fields {
            let raw = self.value(field.key).trim();
            if raw.is_empty() {
                if field.required {
                    errs.push(FieldError::new(field.key, format!("{} is required", field.label)));
                }
                continue;
            }
            let bad = match field.kind {
                FieldKind::Text => false,
                FieldKind::Number => raw.parse::<f64>().is_err(),
                FieldKind::Choice(options) => !options.contains(&raw),
                FieldKind::Reference(_) => raw.parse::<EntityId>().is_err(),
            };
            if bad {
                errs.push(FieldError::new(field.key, format!("{} is invalid", field.label)));
            }
        }
        if errs.is_empty() { Ok(()) } else { Err(errs) }
    }

    fn to_command(&self, mode: DialogMode) -> MutationCommand {
        let mut payload = Map::new();
        for field in self.fields {
            let raw = self.value(field.key).trim();
            if raw.is_empty() {
                continue;
            }
            payload.insert(field.key.to_string(), field_value(field.kind, raw));
        }
        match mode {
            DialogMode::Create => MutationCommand::new("create", None, Value::Object(payload)),
            DialogMode::Edit(id) => {
                MutationCommand::new("update", Some(id), Value::Object(payload))
            }
        }
    }
}

fn field_value(kind: FieldKind, raw: &str) -> Value {
    match kind {
        FieldKind::Number => {
            if let Ok(n) = raw.parse::<i64>() {
                return Value::Number(n.into());
            }
            raw.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(raw.to_string()))
        }
        FieldKind::Reference(_) => match raw.parse::<EntityId>() {
            Ok(id) => Value::Number(id.get().into()),
            Err(_) => Value::String(raw.to_string()),
        },
        FieldKind::Text | FieldKind::Choice(_) => Value::String(raw.to_string()),
    }
}

impl ReferenceOwner for RecordForm {
    fn set_reference(&mut self, key: &str, id: Option<EntityId>) {
        let Some(field) = self.spec(key) else {
            return;
        };
        let value = id.map(|id| id.to_string()).unwrap_or_default();
        self.set_value(field.key, value);
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/forms_tests.rs"]
mod tests;
