use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}};

use todo_feed::{client::{TodoApi, TodoFeed}, config::ClientConfig, domain::todo::TodoId, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClientConfig::from_env();
    if let Some(path) = &config.log_file {
        telemetry::init_to_file(path)?;
    }
    let feed = TodoFeed::new(TodoApi::new(&config.api_url));

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, feed, &config.api_url).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create, Edit, Search }

struct App {
    feed: TodoFeed,
    selected: usize,
    mode: Mode,
    list_state: ListState,
    draft: String,
    editing: Option<TodoId>,
    /// Last failure shown to the user; cleared by the next key press.
    alert: Option<String>,
}

impl App {
    fn selected_id(&self) -> Option<TodoId> {
        self.feed.visible().get(self.selected).map(|t| t.id)
    }

    fn clamp_selection(&mut self) {
        let len = self.feed.visible().len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
    }
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, feed: TodoFeed, api_url: &str) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();
    let mut app = App { feed, selected: 0, mode: Mode::View, list_state: ListState::default(), draft: String::new(), editing: None, alert: None };
    if let Err(e) = app.feed.load().await { app.alert = Some(format!("Failed to load: {e}")); }
    app.clamp_selection();

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
                .split(f.size());

            let header = Paragraph::new("Enter: toggle, n: new, e: edit, d: delete, m: load more, /: filter, q: quit  |  New/Edit/Filter: type, Enter to apply, Esc to cancel")
                .block(Block::default().borders(Borders::ALL).title("todo-feed"));
            f.render_widget(header, chunks[0]);

            let visible = app.feed.visible();
            let mut items: Vec<ListItem> = visible.iter().map(|t| {
                let mark = if t.done { "[x]" } else { "[ ]" };
                let short: String = t.id.to_string().chars().take(4).collect();
                let style = if t.done { Style::default().add_modifier(Modifier::CROSSED_OUT) } else { Style::default() };
                ListItem::new(format!("{mark} {short}  {}", t.content)).style(style)
            }).collect();
            if app.feed.has_no_todos() { items.push(ListItem::new("No items found")); }
            if app.feed.has_more_pages() {
                items.push(ListItem::new(format!("Page {} - press m to load more", app.feed.page())).style(Style::default().fg(Color::DarkGray)));
            }
            if visible.is_empty() { app.list_state.select(None); } else { app.list_state.select(Some(app.selected)); }
            let filter = if app.feed.search().is_empty() { String::new() } else { format!(" filter: \"{}\"", app.feed.search()) };
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(format!("todos [{} loaded]{filter}", app.feed.todos().len())))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, chunks[1], &mut app.list_state);

            let (title, text, style) = match (&app.alert, app.mode) {
                (Some(alert), Mode::View) => ("alert", alert.clone(), Style::default().fg(Color::Red)),
                (None, Mode::View) => ("info", format!("TODO_API_URL={api_url}"), Style::default()),
                (_, Mode::Create) => ("new", format!("Content: {}_", app.draft), Style::default()),
                (_, Mode::Edit) => ("edit", format!("Content: {}_", app.draft), Style::default()),
                (_, Mode::Search) => ("filter", format!("Search: {}_", app.draft), Style::default()),
            };
            let footer = Paragraph::new(text).style(style).block(Block::default().borders(Borders::ALL).title(title));
            f.render_widget(footer, chunks[2]);
        })?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode {
                    Mode::View => {
                        app.alert = None;
                        match key.code {
                            KeyCode::Char('q') => break,
                            KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } }
                            KeyCode::Down => { if app.selected + 1 < app.feed.visible().len() { app.selected += 1; } }
                            KeyCode::Enter => {
                                if let Some(id) = app.selected_id() {
                                    // The row stays flipped even when the server refuses.
                                    if let Err(e) = app.feed.toggle_done(id).await {
                                        app.alert = Some(format!("Failed to update the TODO: {e}"));
                                    }
                                }
                            }
                            KeyCode::Char('d') => {
                                if let Some(id) = app.selected_id() {
                                    // Failures are logged by the feed.
                                    let _ = app.feed.delete(id).await;
                                    app.clamp_selection();
                                }
                            }
                            KeyCode::Char('m') => {
                                if app.feed.has_more_pages() {
                                    if let Err(e) = app.feed.load_more().await { app.alert = Some(format!("Failed to load: {e}")); }
                                }
                            }
                            KeyCode::Char('n') => { app.mode = Mode::Create; app.draft.clear(); }
                            KeyCode::Char('e') => {
                                if let Some(todo) = app.feed.visible().get(app.selected) {
                                    app.editing = Some(todo.id);
                                    app.draft = todo.content.clone();
                                    app.mode = Mode::Edit;
                                }
                            }
                            KeyCode::Char('/') => { app.mode = Mode::Search; app.draft = app.feed.search().to_string(); }
                            _ => {}
                        }
                    }
                    Mode::Create => match key.code {
                        KeyCode::Esc => { app.mode = Mode::View; app.draft.clear(); }
                        KeyCode::Enter => {
                            let content = app.draft.trim().to_string();
                            match app.feed.create(&content).await {
                                Ok(_) => { app.selected = 0; }
                                Err(e) => { app.alert = Some(e.to_string()); }
                            }
                            app.mode = Mode::View;
                            app.draft.clear();
                            app.clamp_selection();
                        }
                        KeyCode::Backspace => { app.draft.pop(); }
                        KeyCode::Char(c) => app.draft.push(c),
                        _ => {}
                    },
                    Mode::Edit => match key.code {
                        KeyCode::Esc => { app.mode = Mode::View; app.draft.clear(); app.editing = None; }
                        KeyCode::Enter => {
                            if let Some(id) = app.editing.take() {
                                let content = app.draft.trim().to_string();
                                if let Err(e) = app.feed.update_content(id, &content).await { app.alert = Some(e.to_string()); }
                            }
                            app.mode = Mode::View;
                            app.draft.clear();
                            app.clamp_selection();
                        }
                        KeyCode::Backspace => { app.draft.pop(); }
                        KeyCode::Char(c) => app.draft.push(c),
                        _ => {}
                    },
                    Mode::Search => match key.code {
                        KeyCode::Esc => { app.mode = Mode::View; app.draft.clear(); }
                        KeyCode::Enter => { app.mode = Mode::View; app.draft.clear(); }
                        KeyCode::Backspace => { app.draft.pop(); app.feed.set_search(app.draft.clone()); app.clamp_selection(); }
                        KeyCode::Char(c) => { app.draft.push(c); app.feed.set_search(app.draft.clone()); app.clamp_selection(); }
                        _ => {}
                    },
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
    Ok(())
}
