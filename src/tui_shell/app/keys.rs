use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::browser::DialogPhase;
use crate::model::{FieldKind, FilterKind, FilterValue, KEYWORD_FILTER, ResourceKind};

use super::{App, Focus, Layer, Overlay, filter_bar};
use crate::tui_shell::Input;

pub(in crate::tui_shell) fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit = true;
        return;
    }
    match app.browser.layer() {
        Layer::Main => main_key(app, key),
        Layer::Filters => filters_key(app, key),
        Layer::Picker => picker_key(app, key, now),
        Layer::Form => form_key(app, key),
        Layer::Confirm => confirm_key(app, key),
        Layer::Upload => upload_key(app, key),
        Layer::Help => app.browser.overlay = Overlay::None,
    }
}

fn main_key(app: &mut App, key: KeyEvent) {
    let focus = app.browser.focus;
    match key.code {
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Char(c @ '1'..='9') => {
            let idx = (c as usize) - ('1' as usize);
            if let Some(kind) = ResourceKind::BROWSABLE.get(idx) {
                app.switch_resource(*kind);
            }
        }

        KeyCode::Up | KeyCode::Char('k') => app.browser.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.browser.move_selection(1),
        KeyCode::Left if focus == Focus::List => app.change_page(-1),
        KeyCode::Right if focus == Focus::List => app.change_page(1),
        KeyCode::Left | KeyCode::Char('[') => app.change_tab_page(-1),
        KeyCode::Right | KeyCode::Char(']') => app.change_tab_page(1),
        KeyCode::Char('+') => app.change_page_size(5),
        KeyCode::Char('-') => app.change_page_size(-5),

        KeyCode::Char('f') | KeyCode::Char('/') => open_filters(app),
        KeyCode::Char('s') => app.search(),
        KeyCode::Char('r') => app.reset_filters(),
        KeyCode::Char('R') => app.refresh(),

        KeyCode::Enter if focus == Focus::List => app.open_detail(),
        KeyCode::Tab if app.browser.detail.is_open() => {
            app.browser.focus = Focus::Detail;
            app.cycle_tab(true);
        }
        KeyCode::BackTab if app.browser.detail.is_open() => {
            app.browser.focus = Focus::Detail;
            app.cycle_tab(false);
        }
        KeyCode::Esc => match focus {
            Focus::Detail => app.browser.focus = Focus::List,
            Focus::List if app.browser.detail.is_open() => app.close_detail(),
            Focus::List => {}
        },

        KeyCode::Char('n') => app.open_create(),
        KeyCode::Char('e') => app.open_edit(),
        KeyCode::Char('i') => app.open_invite(),
        KeyCode::Char('t') => app.toggle_status(),
        KeyCode::Char('x') => app.request_destructive(),
        KeyCode::Char('u') if app.browser.detail.is_open() => {
            app.browser.overlay = Overlay::Upload {
                path: Input::default(),
            };
        }
        KeyCode::Char('?') => app.browser.overlay = Overlay::Help,
        _ => {}
    }
}

fn open_filters(app: &mut App) {
    let keyword = match app.browser.list.filters().get(KEYWORD_FILTER) {
        FilterValue::Text(s) => s.clone(),
        _ => String::new(),
    };
    app.browser.overlay = Overlay::Filters {
        field: 0,
        keyword: Input::with_text(keyword),
    };
}

fn filters_key(app: &mut App, key: KeyEvent) {
    let specs = app.browser.kind.filters();
    let b = &mut app.browser;
    let Overlay::Filters { field, keyword } = &mut b.overlay else {
        return;
    };
    let Some(spec) = specs.get(*field) else {
        b.overlay = Overlay::None;
        return;
    };
    let len = specs.len();

    match key.code {
        KeyCode::Esc => b.overlay = Overlay::None,
        KeyCode::Enter => {
            b.overlay = Overlay::None;
            app.search();
        }
        KeyCode::Up | KeyCode::BackTab => *field = (*field + len - 1) % len,
        KeyCode::Down | KeyCode::Tab => *field = (*field + 1) % len,

        KeyCode::Left | KeyCode::Right => {
            let ids: Vec<_> = b.roles.entries().iter().map(|r| r.id).collect();
            let forward = key.code == KeyCode::Right;
            let current = b.list.filters().get(spec.key).clone();
            if let Some(next) = filter_bar::cycle_value(spec.kind, &current, &ids, forward) {
                if let FilterValue::Id(id) = next {
                    match b.roles.label(id) {
                        Some(label) => b.filter_labels.insert(spec.key, label),
                        None => b.filter_labels.remove(spec.key),
                    };
                }
                b.list.set_filter(spec.key, next);
            }
        }

        KeyCode::Char(' ') if matches!(spec.kind, FilterKind::Reference(_)) => {
            if let FilterKind::Reference(kind) = spec.kind {
                app.open_filter_picker(spec.key, kind);
            }
        }

        _ if spec.kind == FilterKind::Keyword => {
            match key.code {
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    keyword.insert_char(c)
                }
                KeyCode::Backspace => keyword.backspace(),
                KeyCode::Delete => keyword.delete(),
                KeyCode::Char('u') => keyword.clear(),
                _ => return,
            }
            let text = keyword.buf.clone();
            b.list.set_filter(KEYWORD_FILTER, FilterValue::Text(text));
        }

        KeyCode::Delete | KeyCode::Backspace => {
            b.list.set_filter(spec.key, FilterValue::Unset);
            b.filter_labels.remove(spec.key);
        }
        _ => {}
    }
}

fn picker_key(app: &mut App, key: KeyEvent, now: Instant) {
    let b = &mut app.browser;
    match key.code {
        KeyCode::Esc => b.picker.close(),
        KeyCode::Enter => app.picker_select(),
        KeyCode::Delete => app.picker_clear(),
        KeyCode::Up => b.picker_cursor = b.picker_cursor.saturating_sub(1),
        KeyCode::Down => {
            let max = b.picker.options().len().saturating_sub(1);
            b.picker_cursor = (b.picker_cursor + 1).min(max);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            b.picker.clear_keyword(now);
            b.picker_cursor = 0;
        }
        KeyCode::Backspace => {
            let mut kw = b.picker.keyword().to_string();
            kw.pop();
            b.picker.input(kw, now);
            b.picker_cursor = 0;
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let kw = format!("{}{}", b.picker.keyword(), c);
            b.picker.input(kw, now);
            b.picker_cursor = 0;
        }
        _ => {}
    }
}

fn form_key(app: &mut App, key: KeyEvent) {
    if app.browser.dialog.phase() != DialogPhase::Editing {
        if key.code == KeyCode::Esc {
            app.cancel_dialog();
        }
        return;
    }
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.submit_dialog();
        return;
    }

    let b = &mut app.browser;
    let spec = b.dialog.form().editable().get(b.form_field).copied();
    let field_kind = spec.map(|s| s.kind);

    match (key.code, field_kind) {
        (KeyCode::Esc, _) => app.cancel_dialog(),
        (KeyCode::Up | KeyCode::BackTab, _) => app.move_form_field(-1),
        (KeyCode::Down | KeyCode::Tab, _) => app.move_form_field(1),

        (KeyCode::Enter | KeyCode::Char(' '), Some(FieldKind::Reference(_))) => {
            app.open_form_picker()
        }
        (KeyCode::Delete | KeyCode::Backspace, Some(FieldKind::Reference(_))) => {
            if let (Some(spec), Some(form)) = (spec, b.dialog.form_mut()) {
                form.set_value(spec.key, "");
            }
        }
        (KeyCode::Enter, _) => app.submit_dialog(),

        (KeyCode::Left, Some(FieldKind::Choice(_))) => app.cycle_form_choice(false),
        (KeyCode::Right | KeyCode::Char(' '), Some(FieldKind::Choice(_))) => {
            app.cycle_form_choice(true)
        }

        (code, Some(FieldKind::Text | FieldKind::Number)) => {
            match code {
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    b.form_input.insert_char(c)
                }
                KeyCode::Backspace => b.form_input.backspace(),
                KeyCode::Delete => b.form_input.delete(),
                KeyCode::Left => b.form_input.move_left(),
                KeyCode::Right => b.form_input.move_right(),
                _ => return,
            }
            app.sync_form_input();
        }
        _ => {}
    }
}

fn confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('y') => app.confirm(),
        KeyCode::Tab => app.cycle_confirm_action(),
        KeyCode::Esc | KeyCode::Char('n') => app.dismiss_confirm(),
        _ => {}
    }
}

fn upload_key(app: &mut App, key: KeyEvent) {
    let Overlay::Upload { path } = &mut app.browser.overlay else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.browser.overlay = Overlay::None,
        KeyCode::Enter => {
            let path = path.buf.clone();
            app.browser.overlay = Overlay::None;
            app.start_upload(&path);
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => path.insert_char(c),
        KeyCode::Backspace => path.backspace(),
        KeyCode::Delete => path.delete(),
        KeyCode::Left => path.move_left(),
        KeyCode::Right => path.move_right(),
        _ => {}
    }
}

#[cfg(test)]
#[path = "../../tests/tui_shell/keys_tests.rs"]
mod tests;
