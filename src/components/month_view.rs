use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::planner::marking::{TripPosition, MAX_VISIBLE_DOTS};
use crate::planner::{DayMarking, MarkingPalette, Markings};
use crate::theme;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const CELL_W: usize = 5;

pub struct MonthView;

impl MonthView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        selected_date: NaiveDate,
        today: NaiveDate,
        markings: &Markings,
        palette: &MarkingPalette,
    ) {
        let year = selected_date.year();
        let month = selected_date.month();
        let th = theme::current();

        let block = Block::default()
            .title(format!(" {} ", selected_date.format("%B %Y")))
            .title_style(th.header)
            .borders(Borders::ALL)
            .border_style(th.border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let header = Line::from(
            DAY_NAMES
                .iter()
                .map(|d| Span::styled(format!("{:^5}", d), th.header))
                .collect::<Vec<_>>(),
        );

        let first_day = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(selected_date);
        let first_weekday = first_day.weekday().num_days_from_sunday() as i32;
        let days_in_month = days_in_month(year, month) as i32;

        // Each week is two lines: day numbers with trip bars, then event dots
        let mut lines: Vec<Line> = Vec::new();
        let mut current_day: i32 = 1 - first_weekday;

        while current_day <= days_in_month {
            let mut numbers: Vec<Span> = Vec::new();
            let mut dots: Vec<Span> = Vec::new();
            for _ in 0..7 {
                let date = (1..=days_in_month)
                    .contains(&current_day)
                    .then(|| NaiveDate::from_ymd_opt(year, month, current_day as u32))
                    .flatten();
                match date {
                    Some(date) => {
                        let marking = markings.get(&date);
                        numbers.extend(day_cell(date, today, marking));
                        dots.extend(dot_cell(marking));
                    }
                    None => {
                        numbers.push(Span::raw(" ".repeat(CELL_W)));
                        dots.push(Span::raw(" ".repeat(CELL_W)));
                    }
                }
                current_day += 1;
            }
            lines.push(Line::from(numbers));
            lines.push(Line::from(dots));
        }

        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(lines.len() as u16),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

        frame.render_widget(Paragraph::new(header), rows[0]);
        frame.render_widget(Paragraph::new(lines), rows[1]);
        frame.render_widget(Paragraph::new(legend(palette)), rows[2]);
    }
}

/// Day number, painted as part of a trip bar when a trip covers the day.
fn day_cell(date: NaiveDate, today: NaiveDate, marking: Option<&DayMarking>) -> Vec<Span<'static>> {
    let th = theme::current();
    let trip = marking.and_then(|m| m.trip.as_ref()).filter(|t| t.active);
    let selected = marking.is_some_and(|m| m.selected);

    let bar = trip.map(|t| Style::default().bg(theme::paint(&t.color, theme::ACCENT)));
    let fill = bar.unwrap_or_default();
    // Rounded ends leave the outer column unpainted
    let (left, right) = match trip {
        Some(t) => (
            if t.is_start { Style::default() } else { fill },
            if t.is_end { Style::default() } else { fill },
        ),
        None => (Style::default(), Style::default()),
    };

    let mut number = match bar {
        Some(bar) => bar.fg(Color::White).add_modifier(Modifier::BOLD),
        None => Style::default(),
    };
    if date == today {
        number = number.patch(th.today);
    }
    if selected {
        number = number.patch(th.selected);
    }

    let (open, close) = match trip.map(|t| t.position) {
        Some(TripPosition::Single) => ("(", ")"),
        Some(TripPosition::Start) => ("(", " "),
        Some(TripPosition::End) => (" ", ")"),
        Some(TripPosition::Middle) | None => (" ", " "),
    };

    vec![
        Span::styled(open, left.fg(bar_fg(bar))),
        Span::styled(format!("{:>2}", date.day()), number),
        Span::styled(" ", fill),
        Span::styled(close, right.fg(bar_fg(bar))),
    ]
}

fn bar_fg(bar: Option<Style>) -> Color {
    bar.and_then(|s| s.bg).unwrap_or(Color::Reset)
}

fn dot_cell(marking: Option<&DayMarking>) -> Vec<Span<'static>> {
    let Some(marking) = marking else {
        return vec![Span::raw(" ".repeat(CELL_W))];
    };

    let mut spans: Vec<Span> = marking
        .dot_colors(MAX_VISIBLE_DOTS)
        .map(|c| Span::styled("\u{2022}", Style::default().fg(theme::paint(c, Color::Gray))))
        .collect();
    let used = spans.len();
    let pad = CELL_W - used;
    spans.insert(0, Span::raw(" ".repeat(pad / 2)));
    let trailing = pad - pad / 2;
    if marking.hidden_dots(MAX_VISIBLE_DOTS) > 0 {
        spans.push(Span::styled("+", theme::DIM_STYLE));
        spans.push(Span::raw(" ".repeat(trailing - 1)));
    } else {
        spans.push(Span::raw(" ".repeat(trailing)));
    }
    spans
}

fn legend(palette: &MarkingPalette) -> Line<'static> {
    let swatch = |color: &str| Style::default().fg(theme::paint(color, Color::Gray));
    Line::from(vec![
        Span::styled(" \u{25a0} ", swatch(&palette.past_trip)),
        Span::styled("Past Trip ", theme::DIM_STYLE),
        Span::styled(" \u{25a0} ", swatch(&palette.future_trip)),
        Span::styled("Upcoming ", theme::DIM_STYLE),
        Span::styled(" \u{2022} ", swatch(&palette.default_event)),
        Span::styled("Event", theme::DIM_STYLE),
    ])
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (next, NaiveDate::from_ymd_opt(year, month, 1)) {
        (Some(next), Some(first)) => (next - first).num_days() as u32,
        _ => 30,
    }
}
