use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, InputMode, Panel};
use crate::theme;

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let w = area.width as usize;
        let style = theme::current().status;

        let panel = match app.panel {
            Panel::Day => "Day",
            Panel::Agenda => "Agenda",
        };
        let mode = match app.input_mode {
            InputMode::Form => " [New Event]",
            InputMode::Normal => "",
        };

        // Status message wins over hints
        let right = match &app.status_message {
            Some(msg) => format!(" {msg} "),
            None if w >= 90 => {
                " hjkl:Nav [/]:Mon t:Today n:New d:Del Sp:Remind f:Filter a:Agenda g:Group ?:Help q:Quit "
                    .to_string()
            }
            None if w >= 60 => " hjkl:Nav n:New f:Filter a:Agenda ?:Help q:Quit ".to_string(),
            None => " ?:Help q:Quit ".to_string(),
        };

        let left = format!(
            " {} \u{00b7} {} \u{00b7} {}{} ",
            app.group_name,
            panel,
            app.filter.label(),
            mode
        );
        let padding = " ".repeat(w.saturating_sub(left.chars().count() + right.chars().count()));

        let line = Line::from(vec![
            Span::styled(left, style),
            Span::styled(padding, style),
            Span::styled(right, style),
        ]);

        frame.render_widget(Paragraph::new(line).style(style), area);
    }
}
