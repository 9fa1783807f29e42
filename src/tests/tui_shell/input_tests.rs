use super::*;

#[test]
fn edits_respect_multibyte_chars() {
    let mut input = Input::default();
    for c in "café".chars() {
        input.insert_char(c);
    }
    assert_eq!(input.column(), 4);
    input.backspace();
    assert_eq!(input.buf, "caf");
    input.move_left();
    input.move_left();
    input.insert_char('ö');
    assert_eq!(input.buf, "cöaf");
    assert_eq!(input.column(), 2);
}

#[test]
fn delete_and_bounds() {
    let mut input = Input::with_text("ab");
    input.move_right();
    assert_eq!(input.cursor, 2);
    input.delete();
    assert_eq!(input.buf, "ab");
    input.move_left();
    input.delete();
    assert_eq!(input.buf, "a");
    input.clear();
    input.backspace();
    input.move_left();
    assert_eq!(input.cursor, 0);
}
