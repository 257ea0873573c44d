use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::app::Filter;
use crate::planner::{Event, Trip};
use crate::theme;

pub struct AgendaView;

impl AgendaView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        today: NaiveDate,
        filter: Filter,
        trips: &[&Trip],
        events: &[&Event],
    ) {
        let th = theme::current();
        let block = Block::default()
            .title(" Coming Up ")
            .title_style(th.header)
            .borders(Borders::ALL)
            .border_style(th.border);

        let section = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        let mut items: Vec<ListItem> = vec![filter_pills(filter), ListItem::new(Line::from(""))];

        if filter.shows_trips() {
            items.push(ListItem::new(Line::from(Span::styled("Upcoming Trips", section))));
            if trips.is_empty() {
                items.push(ListItem::new(Span::styled("  No trips planned yet", th.dim)));
            }
            for trip in trips {
                let days = trip.days_until(today).unwrap_or_default();
                items.push(ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(format!("  {}", trip.destination), Style::default().add_modifier(Modifier::BOLD)),
                        Span::styled(
                            format!("  in {} day{}", days, if days == 1 { "" } else { "s" }),
                            Style::default().fg(theme::ACCENT),
                        ),
                    ]),
                    Line::from(Span::styled(
                        format!("  {}", trip.range_display()),
                        th.dim,
                    )),
                ]));
            }
            items.push(ListItem::new(Line::from("")));
        }

        if filter.shows_events() {
            items.push(ListItem::new(Line::from(Span::styled("Upcoming Events", section))));
            if events.is_empty() {
                items.push(ListItem::new(Span::styled("  No events scheduled", th.dim)));
            }
            for ev in events {
                let when = match (ev.day(), ev.is_all_day || ev.time.is_none()) {
                    (Some(day), true) => day.format("%a, %b %-d").to_string(),
                    (Some(day), false) => format!("{} at {}", day.format("%a, %b %-d"), ev.time_display()),
                    (None, _) => String::new(),
                };
                let mut spans = vec![
                    Span::styled(format!("  {}", ev.name), Style::default()),
                    Span::styled(format!("  {when}"), th.dim),
                ];
                if ev.reminder {
                    spans.push(Span::styled(" \u{23f0}", Style::default().fg(theme::ACCENT)));
                }
                items.push(ListItem::new(Line::from(spans)));
            }
        }

        frame.render_widget(List::new(items).block(block), area);
    }
}

fn filter_pills(active: Filter) -> ListItem<'static> {
    let th = theme::current();
    let spans: Vec<Span> = [Filter::All, Filter::Trips, Filter::Events]
        .into_iter()
        .flat_map(|f| {
            let style = if f == active { th.selected } else { th.highlight };
            [Span::styled(format!(" {} ", f.label()), style), Span::raw(" ")]
        })
        .collect();
    ListItem::new(Line::from(spans))
}
