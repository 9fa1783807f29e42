use std::collections::BTreeMap;
use std::fmt;

use super::EntityId;

/// Literal accepted on the command line and in forms for "no constraint".
pub const UNSET_SENTINEL: &str = "unset";

/// One filter slot. `Unset` (or an empty text) means "no constraint" and is
/// distinct from a legitimate falsy value such as `Flag(false)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FilterValue {
    #[default]
    Unset,
    Text(String),
    Number(i64),
    Flag(bool),
    Choice(String),
    Id(EntityId),
}

static UNSET: FilterValue = FilterValue::Unset;

impl FilterValue {
    /// Parses a raw `key=value` right-hand side the way the CLI and the
    /// filter bar accept it.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(UNSET_SENTINEL) {
            return FilterValue::Unset;
        }
        match raw {
            "true" => return FilterValue::Flag(true),
            "false" => return FilterValue::Flag(false),
            _ => {}
        }
        if let Ok(n) = raw.parse::<i64>() {
            return FilterValue::Number(n);
        }
        FilterValue::Text(raw.to_string())
    }

    pub fn is_unset(&self) -> bool {
        match self {
            FilterValue::Unset => true,
            FilterValue::Text(s) | FilterValue::Choice(s) => s.trim().is_empty(),
            FilterValue::Number(_) | FilterValue::Flag(_) | FilterValue::Id(_) => false,
        }
    }

    /// Rendering sent to the gateway; `None` when the slot is unconstrained.
    pub fn to_query_value(&self) -> Option<String> {
        if self.is_unset() {
            return None;
        }
        match self {
            FilterValue::Unset => None,
            FilterValue::Text(s) | FilterValue::Choice(s) => Some(s.trim().to_string()),
            FilterValue::Number(n) => Some(n.to_string()),
            FilterValue::Flag(b) => Some(b.to_string()),
            FilterValue::Id(id) => Some(id.to_string()),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_query_value() {
            Some(v) => f.write_str(&v),
            None => f.write_str(UNSET_SENTINEL),
        }
    }
}

/// Filter state of one list view. Keys are optional; a missing key reads as
/// [`FilterValue::Unset`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSet {
    values: BTreeMap<String, FilterValue>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter set with every given key present and unset.
    pub fn with_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let values = keys
            .into_iter()
            .map(|k| (k.to_string(), FilterValue::Unset))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> &FilterValue {
        self.values.get(key).unwrap_or(&UNSET)
    }

    pub fn set(&mut self, key: impl Into<String>, value: FilterValue) {
        self.values.insert(key.into(), value);
    }

    pub fn unset(&mut self, key: &str) {
        if let Some(v) = self.values.get_mut(key) {
            *v = FilterValue::Unset;
        }
    }

    /// Resets every known key to the unset sentinel. Keys are kept so the
    /// filter bar keeps its layout.
    pub fn clear(&mut self) {
        for v in self.values.values_mut() {
            *v = FilterValue::Unset;
        }
    }

    pub fn is_clear(&self) -> bool {
        self.values.values().all(FilterValue::is_unset)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The constraints actually sent to the gateway: unset slots are omitted,
    /// never sent as the sentinel.
    pub fn effective(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .filter_map(|(k, v)| v.to_query_value().map(|q| (k.clone(), q)))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, FilterValue)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, FilterValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Parses `key=value` pairs as given on the command line.
pub fn parse_filter_arg(arg: &str) -> anyhow::Result<(String, FilterValue)> {
    let Some((key, value)) = arg.split_once('=') else {
        anyhow::bail!("filter must be key=value (got {:?})", arg);
    };
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("filter key is empty in {:?}", arg);
    }
    Ok((key.to_string(), FilterValue::parse(value)))
}

#[cfg(test)]
#[path = "../tests/model/filters_tests.rs"]
mod tests;
