use std::collections::BTreeMap;

use crate::model::{EntityId, FilterKind, FilterSet, FilterValue};

/// Next value of a slot that cycles (choice, flag, lookup). Unset is part
/// of the cycle. Keyword and reference slots are edited elsewhere.
pub(in crate::tui_shell) fn cycle_value(
    kind: FilterKind,
    current: &FilterValue,
    lookup: &[EntityId],
    forward: bool,
) -> Option<FilterValue> {
    let mut candidates = vec![FilterValue::Unset];
    match kind {
        FilterKind::Choice(options) => {
            candidates.extend(options.iter().map(|o| FilterValue::Choice(o.to_string())));
        }
        FilterKind::Flag => {
            candidates.extend([FilterValue::Flag(true), FilterValue::Flag(false)]);
        }
        FilterKind::Lookup(_) => {
            candidates.extend(lookup.iter().copied().map(FilterValue::Id));
        }
        FilterKind::Keyword | FilterKind::Reference(_) => return None,
    }
    // Compare on the wire rendering so a typed-in "paid" matches the choice.
    let wanted = current.to_query_value();
    let len = candidates.len();
    let next = match candidates.iter().position(|c| c.to_query_value() == wanted) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    candidates.into_iter().nth(next)
}

pub(in crate::tui_shell) fn display_value(value: &FilterValue, label: Option<&str>) -> String {
    if value.is_unset() {
        return "any".to_string();
    }
    match (value, label) {
        (FilterValue::Id(id), Some(label)) => format!("{} (#{})", label, id),
        _ => value.to_string(),
    }
}

/// One-line rendering of the constrained slots, e.g. `status=paid team=Acme (#4)`.
pub(in crate::tui_shell) fn summary(
    filters: &FilterSet,
    labels: &BTreeMap<&'static str, String>,
) -> String {
    let parts: Vec<String> = filters
        .iter()
        .filter(|(_, v)| !v.is_unset())
        .map(|(k, v)| format!("{}={}", k, display_value(v, labels.get(k).map(String::as_str))))
        .collect();
    if parts.is_empty() {
        "no filters".to_string()
    } else {
        parts.join("  ")
    }
}

#[cfg(test)]
#[path = "../../tests/tui_shell/filter_bar_tests.rs"]
mod tests;
