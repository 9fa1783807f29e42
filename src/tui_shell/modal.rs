use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::browser::{ConfirmPhase, DialogMode, DialogPhase, SearchState};
use crate::model::{FieldKind, FilterKind};

use super::app::filter_bar;
use super::{Browser, Input, Layer, Overlay};

/// Draws whatever sits above the main view. The picker is drawn on top of
/// the form or filter box that opened it.
pub(super) fn draw_overlay(frame: &mut ratatui::Frame, b: &Browser) {
    match b.layer() {
        Layer::Main => {}
        Layer::Filters => draw_filters(frame, b),
        Layer::Form => draw_form(frame, b),
        Layer::Confirm => draw_confirm(frame, b),
        Layer::Upload => draw_upload(frame, b),
        Layer::Help => draw_help(frame),
        Layer::Picker => {
            if b.dialog.is_open() {
                draw_form(frame, b);
            } else if matches!(b.overlay, Overlay::Filters { .. }) {
                draw_filters(frame, b);
            }
            draw_picker(frame, b);
        }
    }
}

fn boxed(frame: &mut ratatui::Frame, title: String, w: u16, h: u16) -> Rect {
    let area = frame.area();
    let w = w.min(area.width.saturating_sub(4)).max(20);
    let h = h.min(area.height.saturating_sub(2)).max(5);
    let box_area = Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    };
    frame.render_widget(Clear, box_area);
    let block = Block::default().borders(Borders::ALL).title(Line::from(vec![
        Span::styled(title, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled("Esc", Style::default().fg(Color::Gray)),
    ]));
    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);
    inner
}

fn marker(on: bool) -> Span<'static> {
    if on {
        Span::styled("> ", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("  ")
    }
}

fn place_cursor(frame: &mut ratatui::Frame, inner: Rect, row: usize, col: u16, input: &Input) {
    let y = inner.y + row as u16;
    if y < inner.y + inner.height {
        frame.set_cursor_position((inner.x + col + input.column(), y));
    }
}

fn draw_filters(frame: &mut ratatui::Frame, b: &Browser) {
    let Overlay::Filters { field, keyword } = &b.overlay else {
        return;
    };
    let specs = b.kind.filters();
    let inner = boxed(
        frame,
        format!("Filters: {}", b.kind.title()),
        70,
        specs.len() as u16 + 4,
    );

    let filters = b.list.filters();
    let mut lines = Vec::new();
    let mut cursor_row = None;
    for (i, spec) in specs.iter().enumerate() {
        let on = i == *field;
        let value = match spec.kind {
            FilterKind::Keyword => {
                if on {
                    cursor_row = Some(i);
                }
                keyword.buf.clone()
            }
            _ => filter_bar::display_value(
                filters.get(spec.key),
                b.filter_labels.get(spec.key).map(String::as_str),
            ),
        };
        let hint = match spec.kind {
            FilterKind::Reference(_) => "  (space to pick)",
            FilterKind::Choice(_) | FilterKind::Flag | FilterKind::Lookup(_) => "  (←/→)",
            FilterKind::Keyword => "",
        };
        lines.push(Line::from(vec![
            marker(on),
            Span::styled(format!("{: <14}", spec.label), Style::default().fg(Color::Gray)),
            Span::raw(value),
            Span::styled(hint, Style::default().fg(Color::DarkGray)),
        ]));
    }
    if let Some(msg) = b.roles.phase().error() {
        lines.push(Line::from(Span::styled(
            format!("roles unavailable: {}", msg),
            Style::default().fg(Color::Red),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);

    if let Some(row) = cursor_row
        && b.layer() == Layer::Filters
    {
        place_cursor(frame, inner, row, 16, keyword);
    }
}

fn draw_form(frame: &mut ratatui::Frame, b: &Browser) {
    let dialog = &b.dialog;
    let form = dialog.form();
    let title = match dialog.mode() {
        DialogMode::Create => format!("New {}", dialog.kind().title().to_lowercase()),
        DialogMode::Edit(id) => format!("Edit {} #{}", dialog.kind().title().to_lowercase(), id),
    };
    let fields = form.editable();
    let inner = boxed(frame, title, 72, fields.len() as u16 + 6);

    if dialog.phase() == DialogPhase::Hydrating {
        frame.render_widget(Paragraph::new("loading record…"), inner);
        return;
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(inner);

    let editing = dialog.phase() == DialogPhase::Editing;
    let mut lines = Vec::new();
    for (i, spec) in fields.iter().enumerate() {
        let on = editing && i == b.form_field;
        let label = if spec.required {
            format!("{}*", spec.label)
        } else {
            spec.label.to_string()
        };
        let value = match spec.kind {
            FieldKind::Text | FieldKind::Number if on => b.form_input.buf.clone(),
            FieldKind::Choice(_) if on => format!("‹ {} ›", form.value(spec.key)),
            FieldKind::Reference(_) if form.value(spec.key).is_empty() => "(none)".to_string(),
            _ => form.display(spec.key),
        };
        lines.push(Line::from(vec![
            marker(on),
            Span::styled(format!("{: <16}", label), Style::default().fg(Color::Gray)),
            Span::raw(value),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), parts[0]);

    let footer = match (dialog.phase(), dialog.error()) {
        (DialogPhase::Submitting, _) => Line::from(Span::styled(
            "saving…",
            Style::default().fg(Color::Cyan),
        )),
        (_, Some(err)) => {
            Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red)))
        }
        _ => Line::from(""),
    };
    frame.render_widget(Paragraph::new(footer).wrap(Wrap { trim: false }), parts[1]);

    if b.layer() == Layer::Form
        && editing
        && fields
            .get(b.form_field)
            .is_some_and(|s| matches!(s.kind, FieldKind::Text | FieldKind::Number))
    {
        place_cursor(frame, parts[0], b.form_field, 18, &b.form_input);
    }
}

fn draw_confirm(frame: &mut ratatui::Frame, b: &Browser) {
    let c = &b.confirm;
    let inner = boxed(frame, "Confirm".to_string(), 64, 8);
    let mut lines = vec![Line::from(c.prompt().unwrap_or_default())];

    let actions = c.kind().destructive_actions();
    if actions.len() > 1 {
        let names: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        lines.push(Line::from(Span::styled(
            format!("tab: switch action ({})", names.join(" / ")),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));
    match (c.phase(), c.error()) {
        (ConfirmPhase::Submitting, _) => {
            lines.push(Line::from(Span::styled("working…", Style::default().fg(Color::Cyan))))
        }
        (_, Some(err)) => {
            lines.push(Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red))))
        }
        _ => lines.push(Line::from(Span::styled(
            "enter/y to confirm, esc/n to keep",
            Style::default().fg(Color::Gray),
        ))),
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_picker(frame: &mut ratatui::Frame, b: &Browser) {
    let p = &b.picker;
    let inner = boxed(frame, format!("Select {}", p.kind().title().to_lowercase()), 60, 16);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let mut search = vec![
        Span::styled("search: ", Style::default().fg(Color::Gray)),
        Span::raw(p.keyword().to_string()),
    ];
    if p.is_debouncing() {
        search.push(Span::styled(" …", Style::default().fg(Color::DarkGray)));
    }
    let mut head = vec![Line::from(search)];
    if let Some(sel) = p.selected() {
        head.push(Line::from(Span::styled(
            format!("current: {}", sel.display_label),
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(Paragraph::new(head), parts[0]);

    let body: Vec<Line> = match p.search_state() {
        SearchState::Idle => Vec::new(),
        SearchState::Loading => vec![Line::from("searching…")],
        SearchState::NotFound => vec![Line::from(Span::styled(
            "no matches",
            Style::default().fg(Color::Yellow),
        ))],
        SearchState::Failed(msg) => vec![Line::from(Span::styled(
            msg.clone(),
            Style::default().fg(Color::Red),
        ))],
        SearchState::Results(options) => {
            let height = parts[1].height as usize;
            let start = b.picker_cursor.saturating_sub(height.saturating_sub(1));
            options
                .iter()
                .enumerate()
                .skip(start)
                .take(height.max(1))
                .map(|(i, o)| {
                    let on = i == b.picker_cursor;
                    let style = if on {
                        Style::default().bg(Color::DarkGray)
                    } else {
                        Style::default()
                    };
                    let mut spans = vec![
                        marker(on),
                        Span::styled(o.display_label.clone(), style.add_modifier(Modifier::BOLD)),
                        Span::styled(format!("  #{}", o.id), Style::default().fg(Color::DarkGray)),
                    ];
                    if let Some(sec) = &o.secondary_label {
                        spans.push(Span::styled(
                            format!("  {}", sec),
                            Style::default().fg(Color::Gray),
                        ));
                    }
                    Line::from(spans)
                })
                .collect()
        }
    };
    frame.render_widget(Paragraph::new(body), parts[1]);

    let x = parts[0].x + 8 + p.keyword().chars().count() as u16;
    frame.set_cursor_position((x.min(parts[0].x + parts[0].width), parts[0].y));
}

fn draw_upload(frame: &mut ratatui::Frame, b: &Browser) {
    let Overlay::Upload { path } = &b.overlay else {
        return;
    };
    let title = match b.detail.id() {
        Some(id) => format!("Attach file to {} #{}", b.kind.title().to_lowercase(), id),
        None => "Attach file".to_string(),
    };
    let inner = boxed(frame, title, 70, 5);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("path: ", Style::default().fg(Color::Gray)),
            Span::raw(path.buf.as_str()),
        ])),
        inner,
    );
    place_cursor(frame, inner, 0, 6, path);
}

const HELP: &[(&str, &str)] = &[
    ("1-7", "switch resource"),
    ("↑/↓ j/k", "move"),
    ("←/→", "list page (or section page in the panel)"),
    ("+/-", "page size"),
    ("f /", "edit filters"),
    ("s", "search with current filters"),
    ("r", "reset filters"),
    ("R", "refresh list"),
    ("enter", "open record"),
    ("tab", "next section"),
    ("n / e", "new / edit"),
    ("i", "invite a member (teams)"),
    ("x", "delete, cancel, revoke or suspend"),
    ("t", "toggle status"),
    ("u", "attach a file"),
    ("esc", "back"),
    ("q", "quit"),
];

fn draw_help(frame: &mut ratatui::Frame) {
    let inner = boxed(frame, "Keys".to_string(), 60, HELP.len() as u16 + 2);
    let lines: Vec<Line> = HELP
        .iter()
        .map(|(k, v)| {
            Line::from(vec![
                Span::styled(format!("{: <10}", k), Style::default().fg(Color::Yellow)),
                Span::raw(*v),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}
