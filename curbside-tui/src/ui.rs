use chrono::{Datelike, NaiveDate};
use curbside_core::{
    CollectionWeek,
    model::{ResolvedCollection, weekday_name},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::{App, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new(format!(
        "curbside – holiday-adjusted collection days · {}",
        app.municipality_name
    ))
    .block(Block::default().borders(Borders::ALL).title("Curbside"));
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::ZoneSelect => draw_zone_select(frame, app, *content_area),
        Screen::AddressLookup => draw_address_lookup(frame, app, *content_area),
        Screen::DateEntry => draw_date_entry(frame, app, *content_area),
        Screen::InspectionView => draw_inspection(frame, app, *content_area),
    }

    let nav_hint = match app.screen {
        Screen::ZoneSelect => "↑/↓ move · Enter/Space select zone · a look up address · q/Ctrl-C quit",
        Screen::AddressLookup => "Type an address · Enter look up · Esc back · Ctrl-C quit",
        Screen::DateEntry => "Type YYYY-MM-DD · Enter inspect · Esc back · Ctrl-C quit",
        Screen::InspectionView => "n/→ next week · p previous week · Esc/←/b back · q/Ctrl-C quit",
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_zone_select(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = app
        .zones
        .iter()
        .enumerate()
        .map(|(idx, zone)| {
            let prefix = if idx == app.zone_list_index {
                "> "
            } else {
                "  "
            };
            ListItem::new(format!(
                "{prefix}{} · collects {}",
                zone.id,
                weekday_name(zone.nominal_day)
            ))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Select zone (↑/↓, Enter) or press a to look up an address"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.zones.is_empty() {
        state.select(Some(app.zone_list_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_address_lookup(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [input_area, help_area] = chunks else {
        return;
    };

    let input = Paragraph::new(app.address_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Street address, e.g. 229 Ardleigh Rd (Enter)"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(input, *input_area);

    let help = Paragraph::new(
        "The address is matched by street name; the house number is ignored.\n\
         A match selects the street's zone and moves on to date entry.",
    )
    .block(Block::default().borders(Borders::ALL).title("Lookup"))
    .wrap(Wrap { trim: true });
    frame.render_widget(help, *help_area);
}

fn draw_date_entry(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let zone_label = app
        .selected_zone
        .as_ref()
        .map_or_else(|| "<zone>".to_owned(), |zone| zone.id.to_string());

    let input = Paragraph::new(app.date_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Date to inspect for {zone_label} (YYYY-MM-DD, Enter)")),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(input, area);
}

fn draw_inspection(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(inspection) = app.inspection.as_ref() else {
        let paragraph = Paragraph::new("Nothing inspected yet.")
            .block(Block::default().borders(Borders::ALL).title("Inspection"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [summary_area, holidays_area] = chunks else {
        return;
    };

    let resolved = &inspection.resolved;
    let summary = Paragraph::new(summary_lines(resolved, app))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} · {}", resolved.zone, resolved.iso_date())),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(summary, *summary_area);

    let week = CollectionWeek::containing(resolved.date);
    let rows = inspection.holidays.iter().map(|holiday| {
        let in_week = week.is_some_and(|week| week.contains(holiday.date));
        let style = if in_week {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        Row::new(vec![
            Cell::from(holiday.date.format("%Y-%m-%d").to_string()),
            Cell::from(weekday_name(holiday.date.weekday())),
            Cell::from(holiday.name.clone()),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Date", "Day", "Holiday"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Holidays in {}", resolved.date.year())),
        )
        .column_spacing(1);

    frame.render_widget(table, *holidays_area);
}

fn summary_lines(resolved: &ResolvedCollection, app: &App) -> Vec<Line<'static>> {
    let effective_style = if resolved.is_shifted() {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };

    let mut lines = vec![
        Line::from(format!("Nominal day:    {}", weekday_name(resolved.nominal_day))),
        Line::styled(
            format!(
                "Effective day:  {} ({})",
                weekday_name(resolved.effective_day),
                resolved.effective_date.format("%Y-%m-%d")
            ),
            effective_style,
        ),
        Line::from(format!(
            "Holiday note:   {}",
            resolved.holiday_note.as_deref().unwrap_or("none")
        )),
        Line::from(format!(
            "Reminder sent:  evening of {}",
            reminder_evening(resolved.effective_date)
        )),
    ];

    if let Some(decision) = &app.reminder_tonight {
        let verdict = if decision.notify { "yes" } else { "no" };
        lines.push(Line::from(format!(
            "Reminder on the evening of {}: {verdict}",
            resolved.iso_date()
        )));
    }

    lines
}

fn reminder_evening(collection: NaiveDate) -> String {
    collection.pred_opt().map_or_else(
        || "<out of range>".to_owned(),
        |eve| format!("{} {}", weekday_name(eve.weekday()), eve.format("%Y-%m-%d")),
    )
}
