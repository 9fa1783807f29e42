use time::macros::datetime;

use super::*;

fn ctx(mode: TimestampMode) -> RenderCtx {
    RenderCtx {
        now: datetime!(2024-05-10 12:00 UTC),
        ts_mode: mode,
    }
}

#[test]
fn relative_mode_uses_coarse_buckets() {
    let c = ctx(TimestampMode::Relative);
    assert_eq!(fmt_ts_list("2024-05-10T11:59:30Z", &c), "just now");
    assert_eq!(fmt_ts_list("2024-05-10T11:15:00Z", &c), "45m ago");
    assert_eq!(fmt_ts_list("2024-05-09T12:00:00Z", &c), "24h ago");
    assert_eq!(fmt_ts_list("2024-05-03T12:00:00Z", &c), "7d ago");
    assert_eq!(fmt_ts_list("2024-01-01T08:30:00Z", &c), "2024-01-01 08:30Z");
}

#[test]
fn absolute_mode_and_passthrough() {
    let c = ctx(TimestampMode::Absolute);
    assert_eq!(fmt_ts_list("2024-05-10T11:59:30Z", &c), "2024-05-10 11:59Z");
    assert_eq!(fmt_ts_list("pending", &c), "pending");
}

#[test]
fn cells_format_only_timestamp_fields() {
    let c = ctx(TimestampMode::Relative);
    let record: Record = serde_json::from_value(serde_json::json!({
        "id": 3,
        "createdAt": "2024-05-10T11:30:00Z",
        "active": true,
        "name": "Acme",
    }))
    .unwrap();
    assert_eq!(fmt_cell(&record, "createdAt", &c), "30m ago");
    assert_eq!(fmt_cell(&record, "active", &c), "yes");
    assert_eq!(fmt_cell(&record, "name", &c), "Acme");
    assert_eq!(fmt_cell(&record, "expiresAt", &c), "");
}
