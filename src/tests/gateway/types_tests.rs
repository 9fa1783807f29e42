use std::collections::BTreeMap;

use serde_json::json;

use super::*;

#[test]
fn query_pairs_append_paging_after_filters() {
    let mut filters = BTreeMap::new();
    filters.insert("teamId".to_string(), "42".to_string());
    filters.insert("page".to_string(), "9".to_string());
    let q = ListQuery::new(ResourceKind::Orders, filters, PageRequest::new(3, 25));
    assert_eq!(
        q.query_pairs(),
        vec![
            ("teamId".to_string(), "42".to_string()),
            ("page".to_string(), "3".to_string()),
            ("pageSize".to_string(), "25".to_string()),
        ]
    );
    assert_eq!(q.filter("teamId"), Some("42"));
    assert_eq!(q.filter("status"), None);
}

#[test]
fn failure_outcome_becomes_rejected_error() {
    let body = json!({"outcome": "failure", "message": "code already used"});
    let resp: MutationResponse = serde_json::from_value(body).unwrap();
    assert_eq!(
        resp.into_result(),
        Err(GatewayError::rejected("code already used"))
    );

    let bare: MutationResponse = serde_json::from_value(json!({"outcome": "failure"})).unwrap();
    assert_eq!(bare.into_result(), Err(GatewayError::rejected("mutation failed")));
}

#[test]
fn success_outcome_carries_data() {
    let resp = MutationResponse::success(Some(json!({"id": 4})));
    assert_eq!(resp.into_result(), Ok(Some(json!({"id": 4}))));
}

#[test]
fn command_serializes_without_missing_id() {
    let cmd = MutationCommand::new("create", None, json!({"name": "x"}));
    let v = serde_json::to_value(&cmd).unwrap();
    assert_eq!(v, json!({"command": "create", "payload": {"name": "x"}}));

    let cmd = MutationCommand::new("delete", Some(EntityId(5)), serde_json::Value::Null);
    let v = serde_json::to_value(&cmd).unwrap();
    assert_eq!(v, json!({"command": "delete", "id": 5, "payload": null}));
}

#[test]
fn upload_file_guesses_content_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logo.PNG");
    std::fs::write(&path, b"\x89PNG").unwrap();
    let file = UploadFile::from_path(&path).unwrap();
    assert_eq!(file.file_name, "logo.PNG");
    assert_eq!(file.content_type, "image/png");
    assert_eq!(file.bytes, b"\x89PNG");

    let other = dir.path().join("notes.bin");
    std::fs::write(&other, b"x").unwrap();
    assert_eq!(
        UploadFile::from_path(&other).unwrap().content_type,
        "application/octet-stream"
    );
}

#[test]
fn upload_failure_is_rejected() {
    let resp = UploadResponse {
        outcome: Outcome::Failure,
        url: None,
        message: None,
    };
    assert_eq!(resp.into_result(), Err(GatewayError::rejected("upload failed")));
}
