use serde_json::json;

use super::*;

#[test]
fn required_fields_are_reported() {
    let form = RecordForm::blank(ResourceKind::PromoCodes);
    let errs = form.validate().unwrap_err();
    let keys: Vec<_> = errs.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(keys, ["code", "discount"]);
}

#[test]
fn typed_values_are_converted_in_the_payload() {
    let mut form = RecordForm::blank(ResourceKind::PromoCodes);
    form.set_value("code", "SPRING");
    form.set_value("discount", "15");
    form.set_reference("packId", Some(EntityId(3)));
    assert!(form.validate().is_ok());

    let cmd = form.to_command(DialogMode::Create);
    assert_eq!(cmd.command, "create");
    assert_eq!(cmd.id, None);
    assert_eq!(cmd.payload, json!({"code": "SPRING", "discount": 15, "packId": 3}));
}

#[test]
fn edit_mode_targets_the_entity() {
    let mut form = RecordForm::blank(ResourceKind::Users);
    form.set_value("name", "Ada");
    form.set_value("email", "ada@example.com");
    let cmd = form.to_command(DialogMode::Edit(EntityId(9)));
    assert_eq!(cmd.command, "update");
    assert_eq!(cmd.id, Some(EntityId(9)));
}

#[test]
fn invalid_number_and_choice_are_rejected() {
    let mut form = RecordForm::blank(ResourceKind::Plans);
    form.set_value("name", "Pro");
    form.set_value("price", "cheap");
    form.set_value("interval", "weekly");
    let errs = form.validate().unwrap_err();
    assert_eq!(errs.len(), 2);
}

#[test]
fn hydrate_copies_fields_and_reference_labels() {
    let entity: Record = serde_json::from_value(json!({
        "id": 4, "name": "Core", "ownerId": 7, "ownerName": "Ada"
    }))
    .unwrap();
    let mut form = RecordForm::blank(ResourceKind::Teams);
    form.hydrate(&entity);
    assert_eq!(form.value("name"), "Core");
    assert_eq!(form.value("ownerId"), "7");
    assert_eq!(form.display("ownerId"), "Ada (#7)");
}

#[test]
fn locked_fields_survive_edits_and_are_sent() {
    let mut form = RecordForm::blank(ResourceKind::TeamMembers).with_locked("teamId", "42");
    form.set_value("teamId", "1");
    form.set_reference("userId", Some(EntityId(5)));
    assert_eq!(form.value("teamId"), "42");
    assert!(form.editable().iter().all(|f| f.key != "teamId"));

    let cmd = form.to_command(DialogMode::Create);
    assert_eq!(cmd.payload, json!({"teamId": 42, "userId": 5}));
}

#[test]
fn clearing_a_reference_empties_the_field() {
    let mut form = RecordForm::blank(ResourceKind::Teams);
    form.set_reference("ownerId", Some(EntityId(7)));
    form.set_label("ownerId", "Ada");
    form.set_reference("ownerId", None);
    assert_eq!(form.value("ownerId"), "");
    assert_eq!(form.display("ownerId"), "");
}

#[test]
fn choice_cycles_through_options_and_empty() {
    let mut form = RecordForm::blank(ResourceKind::Plans);
    form.cycle_choice("interval", true);
    assert_eq!(form.value("interval"), "monthly");
    form.cycle_choice("interval", true);
    assert_eq!(form.value("interval"), "yearly");
    form.cycle_choice("interval", true);
    assert_eq!(form.value("interval"), "");
    form.cycle_choice("interval", false);
    assert_eq!(form.value("interval"), "yearly");
}
