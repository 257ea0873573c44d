use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::planner::{Event, MarkingPalette, Trip, TripStatus};
use crate::theme;

pub struct DayView;

impl DayView {
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        date: NaiveDate,
        today: NaiveDate,
        trips: &[&Trip],
        events: &[&Event],
        focused: usize,
        palette: &MarkingPalette,
    ) {
        let w = area.width as usize;
        let th = theme::current();

        let title = if w >= 30 {
            format!(" {} ", date.format("%A, %B %d, %Y"))
        } else if w >= 18 {
            format!(" {} ", date.format("%b %d, %Y"))
        } else {
            format!(" {} ", date.format("%m/%d"))
        };

        let mut counts = Vec::new();
        if !trips.is_empty() {
            let n = trips.len();
            counts.push(format!("{} trip{}", n, if n == 1 { "" } else { "s" }));
        }
        if !events.is_empty() {
            let n = events.len();
            counts.push(format!("{} event{}", n, if n == 1 { "" } else { "s" }));
        }
        let count_str = if counts.is_empty() {
            String::new()
        } else {
            format!(" {} ", counts.join(", "))
        };

        let block = Block::default()
            .title(title)
            .title_style(th.header)
            .title_bottom(Line::from(Span::styled(count_str, th.dim)))
            .borders(Borders::ALL)
            .border_style(th.border);

        if trips.is_empty() && events.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("Nothing planned for this day").style(th.dim);
            frame.render_widget(msg, inner);
            return;
        }

        let section = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        let mut items: Vec<ListItem> = Vec::new();

        if !trips.is_empty() {
            items.push(ListItem::new(Line::from(Span::styled("Trips", section))));
            for trip in trips {
                items.push(format_trip(trip, today, palette));
            }
            if !events.is_empty() {
                items.push(ListItem::new(Line::from("")));
            }
        }

        if !events.is_empty() {
            items.push(ListItem::new(Line::from(Span::styled("Events", section))));
            for (i, ev) in events.iter().enumerate() {
                items.push(format_event(ev, i == focused, palette));
            }
        }

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

fn format_trip(trip: &Trip, today: NaiveDate, palette: &MarkingPalette) -> ListItem<'static> {
    let (color, status) = match trip.auto_status(today) {
        TripStatus::Completed => (&palette.past_trip, "completed"),
        _ => (&palette.future_trip, "planned"),
    };
    let mut spans = vec![
        Span::styled("  ", Style::default().bg(theme::paint(color, theme::ACCENT))),
        Span::styled(format!(" {}", trip.destination), Style::default()),
    ];
    if let Some(country) = trip.country.as_deref().filter(|c| !c.is_empty()) {
        spans.push(Span::styled(format!(", {country}"), theme::DIM_STYLE));
    }
    spans.push(Span::styled(
        format!("  {} \u{00b7} {}", trip.range_display(), status),
        theme::DIM_STYLE,
    ));
    ListItem::new(Line::from(spans))
}

fn format_event(ev: &Event, focused: bool, palette: &MarkingPalette) -> ListItem<'static> {
    let color = ev.color.as_deref().unwrap_or(&palette.default_event);
    let indicator = Span::styled("  ", Style::default().bg(theme::paint(color, Color::Gray)));

    let time_span = Span::styled(
        format!(" {:<7} ", ev.time_display()),
        Style::default().add_modifier(Modifier::DIM),
    );
    let name_style = if focused {
        theme::current().highlight
    } else {
        Style::default()
    };

    let mut spans = vec![indicator, time_span, Span::styled(ev.name.clone(), name_style)];
    if ev.reminder {
        spans.push(Span::styled(" \u{23f0}", Style::default().fg(theme::ACCENT)));
    }
    ListItem::new(Line::from(spans))
}

/// Render the focused event's detail popup.
pub fn render_detail_popup(frame: &mut Frame, area: Rect, ev: &Event, palette: &MarkingPalette) {
    let popup_w = area.width.clamp(30, 60);
    let popup_h = area.height.clamp(8, 16);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

    frame.render_widget(Clear, popup_area);

    let color = theme::paint(ev.color.as_deref().unwrap_or(&palette.default_event), Color::Gray);
    let block = Block::default()
        .title(format!(" {} ", ev.name))
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines: Vec<Line> = vec![
        Line::from(vec![
            Span::styled("  ", Style::default().bg(color)),
            Span::styled(format!(" {}", ev.kind_label()), Style::default()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Time: ", theme::DIM_STYLE),
            Span::styled(ev.time_display(), Style::default()),
        ]),
    ];

    if let Some(day) = ev.day() {
        lines.push(Line::from(vec![
            Span::styled("Date: ", theme::DIM_STYLE),
            Span::styled(day.format("%A, %B %d, %Y").to_string(), Style::default()),
        ]));
    }

    lines.push(Line::from(vec![
        Span::styled("Reminder: ", theme::DIM_STYLE),
        Span::styled(if ev.reminder { "On" } else { "Off" }, Style::default()),
    ]));

    if let Some(notes) = ev.notes.as_deref().filter(|n| !n.is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Notes:", theme::DIM_STYLE)));
        for line in notes.lines() {
            lines.push(Line::from(line.to_string()));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press Esc to close", theme::DIM_STYLE)));

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
