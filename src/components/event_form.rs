use chrono::{NaiveDate, NaiveTime};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::planner::event::EVENT_KINDS;
use crate::theme;

pub const PRESET_COLORS: [&str; 6] = [
    "#e07a5f", "#3d405b", "#81b29a", "#f2cc8f", "#2a9d8f", "#9b5de5",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Name,
    Date,
    Time,
    AllDay,
    Kind,
    Color,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Name => FormField::Date,
            FormField::Date => FormField::Time,
            FormField::Time => FormField::AllDay,
            FormField::AllDay => FormField::Kind,
            FormField::Kind => FormField::Color,
            FormField::Color => FormField::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Name => FormField::Color,
            FormField::Date => FormField::Name,
            FormField::Time => FormField::Date,
            FormField::AllDay => FormField::Time,
            FormField::Kind => FormField::AllDay,
            FormField::Color => FormField::Kind,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventFormState {
    pub name: String,
    pub date: String,
    pub time: String,
    pub is_all_day: bool,
    pub kind_index: usize,
    pub color_index: usize,
    pub active_field: FormField,
}

impl EventFormState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            name: String::new(),
            date: date.format("%Y-%m-%d").to_string(),
            time: "18:00".to_string(),
            is_all_day: false,
            kind_index: EVENT_KINDS.iter().position(|k| *k == "activity").unwrap_or(0),
            color_index: 0,
            active_field: FormField::Name,
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    pub fn parsed_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.time.trim(), "%H:%M").ok()
    }

    pub fn kind(&self) -> &'static str {
        EVENT_KINDS[self.kind_index % EVENT_KINDS.len()]
    }

    pub fn color(&self) -> &'static str {
        PRESET_COLORS[self.color_index % PRESET_COLORS.len()]
    }

    pub fn next_field(&mut self) {
        self.active_field = self.active_field.next();
        if self.is_all_day && self.active_field == FormField::Time {
            self.active_field = self.active_field.next();
        }
    }

    pub fn prev_field(&mut self) {
        self.active_field = self.active_field.prev();
        if self.is_all_day && self.active_field == FormField::Time {
            self.active_field = self.active_field.prev();
        }
    }

    pub fn input_char(&mut self, c: char) {
        match self.active_field {
            FormField::Name => self.name.push(c),
            FormField::Date => self.date.push(c),
            FormField::Time => self.time.push(c),
            FormField::AllDay | FormField::Kind | FormField::Color => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            FormField::Name => { self.name.pop(); }
            FormField::Date => { self.date.pop(); }
            FormField::Time => { self.time.pop(); }
            FormField::AllDay | FormField::Kind | FormField::Color => {}
        }
    }

    /// Space: toggle or cycle on choice fields, a literal space elsewhere.
    pub fn space(&mut self) {
        match self.active_field {
            FormField::AllDay => self.is_all_day = !self.is_all_day,
            FormField::Kind => self.kind_index = (self.kind_index + 1) % EVENT_KINDS.len(),
            FormField::Color => self.color_index = (self.color_index + 1) % PRESET_COLORS.len(),
            _ => self.input_char(' '),
        }
    }
}

pub struct EventForm;

impl EventForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &EventFormState) {
        // Center the form popup
        let form_w = area.width.clamp(30, 50);
        let form_h = area.height.clamp(10, 14);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h).intersection(area);

        frame.render_widget(Clear, form_area);

        let block = Block::default()
            .title(" Add Event ")
            .title_style(Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // name
            Constraint::Length(1), // date
            Constraint::Length(1), // time
            Constraint::Length(1), // all day
            Constraint::Length(1), // type
            Constraint::Length(1), // color
            Constraint::Length(1), // spacer
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(inner);

        let active = state.active_field;
        render_field(frame, rows[0], "Name:", &state.name, active == FormField::Name);
        render_field(frame, rows[1], "Date:", &state.date, active == FormField::Date);

        if state.is_all_day {
            render_field(frame, rows[2], "Time:", "--:--", false);
        } else {
            render_field(frame, rows[2], "Time:", &state.time, active == FormField::Time);
        }

        let all_day_val = if state.is_all_day { "[x] All Day" } else { "[ ] All Day" };
        render_field(frame, rows[3], "", all_day_val, active == FormField::AllDay);

        let kind = format!("< {} >", state.kind());
        render_field(frame, rows[4], "Type:", &kind, active == FormField::Kind);

        let swatch = theme::paint(state.color(), theme::ACCENT);
        let color_line = Line::from(vec![
            Span::styled(format!("{:<7}", "Color:"), theme::current().dim),
            Span::styled("    ", Style::default().bg(swatch)),
            Span::styled(
                format!(" {}", state.color()),
                if active == FormField::Color {
                    Style::default().fg(ratatui::style::Color::Cyan)
                } else {
                    Style::default()
                },
            ),
        ]);
        frame.render_widget(Paragraph::new(color_line), rows[5]);

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", theme::current().dim),
            Span::styled("Space", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Pick ", theme::current().dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Save ", theme::current().dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", theme::current().dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[7]);
    }
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let label_w = if label.is_empty() { 0 } else { 7 };
    let cursor = if active { "_" } else { "" };

    let style = if active {
        Style::default().fg(ratatui::style::Color::Cyan)
    } else {
        Style::default()
    };

    let mut spans = Vec::new();
    if !label.is_empty() {
        spans.push(Span::styled(
            format!("{:<width$}", label, width = label_w),
            theme::current().dim,
        ));
    }
    spans.push(Span::styled(format!("{}{}", value, cursor), style));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> EventFormState {
        EventFormState::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    #[test]
    fn all_day_skips_time_field() {
        let mut f = form();
        f.active_field = FormField::AllDay;
        f.space();
        assert!(f.is_all_day);
        f.active_field = FormField::Date;
        f.next_field();
        assert_eq!(f.active_field, FormField::AllDay);
        f.prev_field();
        assert_eq!(f.active_field, FormField::Date);
    }

    #[test]
    fn choice_fields_cycle() {
        let mut f = form();
        assert_eq!(f.kind(), "activity");
        f.active_field = FormField::Kind;
        f.space();
        assert_eq!(f.kind(), "other");
        f.space();
        assert_eq!(f.kind(), "dinner");

        f.active_field = FormField::Color;
        for _ in 0..PRESET_COLORS.len() {
            f.space();
        }
        assert_eq!(f.color(), PRESET_COLORS[0]);
    }

    #[test]
    fn typing_edits_text_fields() {
        let mut f = form();
        for c in "Tapas night".chars() {
            f.input_char(c);
        }
        f.backspace();
        assert_eq!(f.name, "Tapas nigh");
        f.active_field = FormField::Time;
        f.backspace();
        f.backspace();
        assert_eq!(f.time, "18:");
        assert!(f.parsed_time().is_none());
        assert_eq!(f.parsed_date(), NaiveDate::from_ymd_opt(2024, 6, 1));
    }
}
