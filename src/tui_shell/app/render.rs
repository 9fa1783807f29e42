use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs, Wrap};
use time::OffsetDateTime;

use crate::browser::{LoadPhase, PrimaryState, TabState};
use crate::model::{Record, ResourceKind};
use crate::tui_shell::{RenderCtx, fmt_cell, fmt_ts_ui, modal, render_view_chrome};

use super::{App, Browser, Focus, Layer, filter_bar};

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(area);

    let b = &app.browser;
    draw_header(frame, app, chunks[0]);

    let ctx = RenderCtx {
        now: OffsetDateTime::now_utc(),
        ts_mode: app.config.timestamps,
    };
    if b.detail.is_open() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);
        draw_list(frame, b, &ctx, cols[0]);
        draw_detail(frame, b, &ctx, cols[1]);
    } else {
        draw_list(frame, b, &ctx, chunks[1]);
    }

    draw_status(frame, b, chunks[2]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            hints(b),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        ))),
        chunks[3],
    );

    if b.layer() != Layer::Main {
        dim_frame(frame);
        modal::draw_overlay(frame, b);
    }
}

fn draw_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled("Backoffice", Style::default().fg(Color::Black).bg(Color::White)),
        Span::raw("  "),
    ];
    for (i, kind) in ResourceKind::BROWSABLE.iter().enumerate() {
        let style = if *kind == app.browser.kind {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!("{} {}", i + 1, kind.title()), style));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        app.gateway.base_url().to_string(),
        Style::default().fg(Color::DarkGray),
    ));
    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn draw_list(frame: &mut ratatui::Frame, b: &Browser, ctx: &RenderCtx, area: Rect) {
    let list = &b.list;
    let page = list.page();
    let title = format!(
        "{}  page {}/{}  total {}  size {}",
        b.kind.title(),
        page.page(),
        list.page_count().max(1),
        list.total(),
        page.page_size()
    );
    let note = list.is_loading().then_some("loading…");
    let inner = render_view_chrome(frame, &title, note, b.focus == Focus::List, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            filter_bar::summary(list.filters(), &b.filter_labels),
            Style::default().fg(Color::Cyan),
        ))),
        parts[0],
    );

    if let LoadPhase::Failed(msg) = list.phase() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("{}  (R to retry)", msg),
                Style::default().fg(Color::Red),
            )))
            .wrap(Wrap { trim: false }),
            parts[1],
        );
        return;
    }
    if list.records().is_empty() {
        let text = if list.is_loading() { "loading…" } else { "(no records)" };
        frame.render_widget(Paragraph::new(text), parts[1]);
        return;
    }

    let selected = (b.focus == Focus::List).then_some(b.selected);
    draw_records(frame, b.kind.columns(), list.records(), selected, ctx, parts[1]);
}

fn draw_records(
    frame: &mut ratatui::Frame,
    columns: &[&str],
    records: &[Record],
    selected: Option<usize>,
    ctx: &RenderCtx,
    area: Rect,
) {
    let header = Row::new(columns.iter().map(|c| Cell::from(c.to_string())))
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let rows = records.iter().map(|r| {
        Row::new(columns.iter().map(|c| Cell::from(fmt_cell(r, c, ctx))))
    });
    let widths = vec![Constraint::Fill(1); columns.len().max(1)];
    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_detail(frame: &mut ratatui::Frame, b: &Browser, ctx: &RenderCtx, area: Rect) {
    let d = &b.detail;
    let title = match d.id() {
        Some(id) => format!("{} #{}", b.kind.title(), id),
        None => b.kind.title().to_string(),
    };
    let note = d.is_loading().then_some("loading…");
    let inner = render_view_chrome(frame, &title, note, b.focus == Focus::Detail, area);

    let specs = d.tab_specs();
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints(if specs.is_empty() {
            vec![Constraint::Min(0)]
        } else {
            vec![Constraint::Percentage(45), Constraint::Length(1), Constraint::Min(0)]
        })
        .split(inner);

    let primary: Vec<Line> = match d.primary_state() {
        None | Some(PrimaryState::Loading) => vec![Line::from("loading…")],
        Some(PrimaryState::NotFound) => vec![Line::from(Span::styled(
            "not found",
            Style::default().fg(Color::Yellow),
        ))],
        Some(PrimaryState::Failed(msg)) => vec![Line::from(Span::styled(
            format!("{}  (close and reopen to retry)", msg),
            Style::default().fg(Color::Red),
        ))],
        Some(PrimaryState::Loaded(record)) => record
            .0
            .keys()
            .map(|k| {
                Line::from(vec![
                    Span::styled(format!("{: <14}", k), Style::default().fg(Color::Gray)),
                    Span::raw(fmt_cell(record, k, ctx)),
                ])
            })
            .collect(),
    };
    frame.render_widget(Paragraph::new(primary).wrap(Wrap { trim: true }), parts[0]);

    if specs.is_empty() {
        return;
    }
    let active = d.active_tab();
    let titles: Vec<Line> = specs.iter().map(|s| Line::from(s.label)).collect();
    let tabs = Tabs::new(titles)
        .select(specs.iter().position(|s| Some(s.key) == active).unwrap_or(0))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, parts[1]);

    let Some(key) = active else {
        frame.render_widget(Paragraph::new("Tab to load a section"), parts[2]);
        return;
    };
    let (Some(spec), Some(tab)) = (b.kind.tab(key), d.tab(key)) else {
        return;
    };
    draw_tab(frame, b, spec.kind, tab, ctx, parts[2]);
}

fn draw_tab(
    frame: &mut ratatui::Frame,
    b: &Browser,
    kind: ResourceKind,
    tab: &TabState<Record>,
    ctx: &RenderCtx,
    area: Rect,
) {
    if let LoadPhase::Failed(msg) = tab.phase() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("{}  (close and reopen to retry)", msg),
                Style::default().fg(Color::Red),
            )))
            .wrap(Wrap { trim: false }),
            area,
        );
        return;
    }
    if tab.records().is_empty() {
        let text = if tab.is_loading() || !tab.loaded_once() { "loading…" } else { "(empty)" };
        frame.render_widget(Paragraph::new(text), area);
        return;
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let selected = (b.focus == Focus::Detail).then_some(b.tab_selected);
    draw_records(frame, kind.columns(), tab.records(), selected, ctx, parts[0]);

    let page = tab.page();
    let mut footer = format!(
        "page {}/{}  total {}",
        page.page(),
        page.page_count(tab.total()).max(1),
        tab.total()
    );
    if tab.is_loading() {
        footer.push_str("  loading…");
    }
    frame.render_widget(
        Paragraph::new(Span::styled(footer, Style::default().fg(Color::DarkGray))),
        parts[1],
    );
}

fn draw_status(frame: &mut ratatui::Frame, b: &Browser, area: Rect) {
    let line = match &b.status {
        Some(s) => {
            let style = if s.error {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(format!("{} ", fmt_ts_ui(&s.ts)), Style::default().fg(Color::Gray)),
                Span::styled(s.text.as_str(), style),
            ])
        }
        None => Line::from(""),
    };
    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::TOP)),
        area,
    );
}

fn hints(b: &Browser) -> String {
    match b.layer() {
        Layer::Main if b.detail.is_open() => {
            "tab section  [/] section page  e edit  x remove  t status  u upload  i invite  esc back  ? help"
        }
        Layer::Main => {
            "enter open  ←/→ page  +/- size  f filters  r reset  R refresh  n new  e edit  x remove  ? help"
        }
        Layer::Filters => "↑/↓ field  ←/→ value  space pick  del clear  enter search  esc close",
        Layer::Picker => "type to search  ↑/↓ move  enter select  del clear  ctrl-u clear text  esc close",
        Layer::Form => "↑/↓ field  ←/→ choice  enter pick/save  ctrl-s save  esc cancel",
        Layer::Confirm => "enter/y confirm  tab next action  esc/n cancel",
        Layer::Upload => "enter upload  esc cancel",
        Layer::Help => "any key to close",
    }
    .to_string()
}

fn dim_frame(frame: &mut ratatui::Frame) {
    let area = frame.area();
    let buf = frame.buffer_mut();
    for y in area.y..area.y.saturating_add(area.height) {
        for x in area.x..area.x.saturating_add(area.width) {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.modifier |= Modifier::DIM;
            }
        }
    }
}
