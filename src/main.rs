mod app;
mod components;
mod config;
mod logging;
mod planner;
mod theme;
mod tui;

use std::time::Duration;

use app::{App, InputMode, Panel};
use clap::Parser;
use color_eyre::eyre::{bail, Result};
use chrono::Local;
use config::{Cli, Command, Paths, TripCommand};
use crossterm::event::{KeyCode, KeyModifiers};
use planner::{Store, Trip};
use ratatui::layout::{Constraint, Layout, Rect};
use tracing::info;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let paths = Paths::resolve(&cli)?;
    logging::init(&paths.log)?;
    info!(data = %paths.data.display(), user = %cli.user, "starting");

    let mut store = Store::open(&paths.data)?;

    if let Some(command) = cli.command {
        return run_command(&mut store, &cli.user, cli.group.as_deref(), command);
    }

    let Some(session) = store.resolve_session(&cli.user, cli.group.as_deref()) else {
        bail!(
            "{} is not in any group yet. Start one with `wondertogether create <name>` \
             or join with `wondertogether join <code>`.",
            cli.user
        );
    };

    theme::init(&paths.theme);
    let mut app = App::new(store, session, theme::current().palette.clone());

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app);
    tui::restore()?;
    result
}

fn run_command(store: &mut Store, user: &str, group: Option<&str>, command: Command) -> Result<()> {
    match command {
        Command::Groups => {
            let groups = store.groups_for_user(user);
            if groups.is_empty() {
                println!("No groups yet.");
            }
            for g in groups {
                println!("{}  {}  ({} members, code {})", g.id, g.name, g.members.len(), g.join_code);
            }
        }
        Command::Create { name } => {
            let group = store.create_group(&name, user)?;
            println!("Created {}. Share join code {} to invite others.", group.name, group.join_code);
        }
        Command::Join { code } => {
            let group = store.join_group(&code, user)?;
            println!("Joined {}.", group.name);
        }
        Command::Leave { group } => {
            let next = store.leave_group(&group, user)?;
            println!("Left group {group}. Now using {}.", next.name);
        }
        Command::Trip(action) => {
            let Some(session) = store.resolve_session(user, group) else {
                bail!("{user} is not in any group yet.");
            };
            let today = Local::now().date_naive();
            match action {
                TripCommand::Add { destination, start, end, country } => {
                    let trip = Trip::new(&session.group_id, &destination, country, start, end, today);
                    let id = trip.id.clone();
                    store.insert_trip(trip)?;
                    println!("Planned {destination} ({id}).");
                }
                TripCommand::List => {
                    let trips = store.trips_for_group(&session.group_id);
                    if trips.is_empty() {
                        println!("No trips yet.");
                    }
                    for t in trips {
                        println!(
                            "{}  {}  {}  {:?}",
                            t.id,
                            t.destination,
                            t.range_display(),
                            t.auto_status(today)
                        );
                    }
                }
                TripCommand::Remove { id } => {
                    if !store.trips_for_group(&session.group_id).iter().any(|t| t.id == id) {
                        bail!("No trip with id {id} in this group");
                    }
                    let trip = store.delete_trip(&id)?;
                    println!("Removed {}.", trip.destination);
                }
            }
        }
    }
    Ok(())
}

fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    while app.running {
        app.set_today(Local::now().date_naive());
        terminal.draw(|frame| {
            let area = frame.area();

            let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
            render_main(frame, layout[0], app);

            if let Some(ref form) = app.form_state {
                components::EventForm::render(frame, area, form);
            }

            if app.show_detail {
                if let Some(ev) = app.focused_event() {
                    components::day_view::render_detail_popup(frame, area, ev, app.palette());
                }
            }

            if app.show_help {
                render_help(frame, area);
            }

            components::StatusBar::render(frame, layout[1], app);
        })?;

        if let Some(key) = tui::next_key(Duration::from_millis(100))? {
            app.status_message = None;

            if app.show_help {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                    app.show_help = false;
                }
                continue;
            }

            if app.show_detail {
                if key.code == KeyCode::Esc {
                    app.show_detail = false;
                }
                continue;
            }

            match app.input_mode {
                InputMode::Form => handle_form_input(app, key.code),
                InputMode::Normal => handle_normal_input(app, key.code, key.modifiers),
            }
        }
    }

    Ok(())
}

fn handle_normal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
        }
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => app.prev_day(),
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => app.next_day(),
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.prev_week(),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.next_week(),
        (KeyCode::Tab, _) => app.scroll_down(),
        (KeyCode::BackTab, _) => app.scroll_up(),
        (KeyCode::Char('['), _) => app.prev_month(),
        (KeyCode::Char(']'), _) => app.next_month(),
        (KeyCode::Char('t'), _) => app.go_to_today(),
        (KeyCode::Char('f'), _) => app.cycle_filter(),
        (KeyCode::Char('a'), _) => app.toggle_panel(),
        (KeyCode::Char('g'), _) => app.next_group(),
        (KeyCode::Char('r'), _) => {
            app.refresh();
            app.status_message = Some("Refreshed".to_string());
        }
        (KeyCode::Char('n'), _) => app.open_event_form(),
        (KeyCode::Char('d'), _) => app.delete_focused_event(),
        (KeyCode::Char(' '), _) => app.toggle_focused_reminder(),
        (KeyCode::Enter, _) => app.open_detail(),
        (KeyCode::Char('?'), _) => app.show_help = true,
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.close_event_form(),
        KeyCode::Enter => app.submit_event_form(),
        _ => {
            let Some(form) = app.form_mut() else {
                return;
            };
            match code {
                KeyCode::Tab => form.next_field(),
                KeyCode::BackTab => form.prev_field(),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Char(' ') => form.space(),
                KeyCode::Char(c) => form.input_char(c),
                _ => {}
            }
        }
    }
}

fn render_main(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    if area.width < 70 {
        render_month(frame, area, app);
        return;
    }

    let content = Layout::horizontal([Constraint::Length(39), Constraint::Min(20)]).split(area);
    render_month(frame, content[0], app);

    match app.panel {
        Panel::Day => components::DayView::render(
            frame,
            content[1],
            app.selected_date,
            app.today,
            &app.selected_trips(),
            &app.selected_events(),
            app.day_scroll,
            app.palette(),
        ),
        Panel::Agenda => components::AgendaView::render(
            frame,
            content[1],
            app.today,
            app.filter,
            &app.upcoming_trips(),
            &app.upcoming_events(),
        ),
    }
}

fn render_month(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    components::MonthView::render(
        frame,
        area,
        app.selected_date,
        app.today,
        &app.markings,
        app.palette(),
    );
}

fn render_help(frame: &mut ratatui::Frame, area: Rect) {
    use ratatui::style::{Color, Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

    let popup_w = area.width.clamp(30, 54);
    let popup_h = area.height.clamp(12, 24);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {k:<10}"), theme::KEY_STYLE),
            Span::raw(desc),
        ])
    };

    let lines = vec![
        Line::from(Span::styled("Navigation", section_style)),
        key("h/l", "Previous/next day"),
        key("j/k", "Next/previous week"),
        key("[/]", "Previous/next month"),
        key("t", "Jump to today"),
        key("Tab", "Focus next event of the day"),
        Line::from(""),
        Line::from(Span::styled("Views", section_style)),
        key("a", "Day details / coming up"),
        key("f", "Filter: all, trips, events"),
        key("g", "Switch group"),
        Line::from(""),
        Line::from(Span::styled("Actions", section_style)),
        key("Enter", "Event details"),
        key("n", "Add event"),
        key("d", "Delete focused event"),
        key("Space", "Toggle reminder"),
        key("r", "Reload from disk"),
        Line::from(""),
        key("Esc", "Close popup or form"),
        key("q", "Quit"),
    ];

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
