use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, Frame, widgets::{Block, Borders, Clear, List, ListItem, Paragraph, ListState, Wrap}, layout::{Layout, Constraint, Direction, Rect}, style::{Style, Modifier, Color}};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use todo_crud::{
    application::todo_service::Saved,
    client::{api::{HttpTodoApi, TodoApi}, board::{Confirm, EditState}, ClientError, PendingSubmit, TodoClient},
    config::Config,
    domain::todo::Todo,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    init_file_logging(&config)?;
    let client = TodoClient::new(HttpTodoApi::new(config.api_url.clone()));

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, client, &config.api_url).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

/// The screen is the only output, so logs go to a file, and only when `TODO_TUI_LOG` is set.
fn init_file_logging(config: &Config) -> Result<()> {
    let Some(path) = &config.tui_log else { return Ok(()) };
    let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Service replies, delivered back to the event loop from the tasks that awaited them.
enum Reply {
    Loaded(anyhow::Result<Vec<Todo>>),
    Created(PendingSubmit, anyhow::Result<Saved>),
}

fn spawn_load(api: HttpTodoApi, tx: UnboundedSender<Reply>) {
    tokio::spawn(async move {
        let _ = tx.send(Reply::Loaded(api.list().await));
    });
}

fn spawn_create(api: HttpTodoApi, pending: PendingSubmit, tx: UnboundedSender<Reply>) {
    tokio::spawn(async move {
        let result = api.create(pending.payload().clone()).await;
        let _ = tx.send(Reply::Created(pending, result));
    });
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create, Edit, Confirm }

#[derive(Clone, Copy, PartialEq, Eq)]
enum ActiveField { Title, Description }

struct App {
    client: TodoClient<HttpTodoApi>,
    selected: usize,
    last_tick: Instant,
    list_state: ListState,
    creating: bool,
    field: ActiveField,
    notice: Option<String>,
}

impl App {
    fn mode(&self) -> Mode {
        let board = self.client.board();
        if board.pending_confirm().is_some() { Mode::Confirm }
        else if board.is_editing() { Mode::Edit }
        else if self.creating { Mode::Create }
        else { Mode::View }
    }

    fn clamp_selection(&mut self) {
        let len = self.client.board().len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
    }

    fn selected_todo(&self) -> Option<&Todo> {
        let board = self.client.board();
        board.id_at(self.selected).and_then(|id| board.get(id))
    }

    fn report<T>(&mut self, result: Result<T, ClientError>) {
        self.notice = result.err().map(|e| e.to_string());
    }

    fn apply(&mut self, reply: Reply, api_url: &str) {
        match reply {
            Reply::Loaded(result) => {
                if !self.client.finish_load(result) {
                    self.notice = Some(format!("could not load todos from {api_url}"));
                }
            }
            Reply::Created(pending, result) => match self.client.finish_submit(pending, result) {
                Some(id) => {
                    self.notice = None;
                    if !self.client.board().is_editing() {
                        if let Some(pos) = self.client.board().position(id) { self.selected = pos; }
                    }
                }
                None => self.notice = Some("todo was not saved".into()),
            },
        }
        self.clamp_selection();
    }

    fn drain(&mut self, rx: &mut UnboundedReceiver<Reply>, api_url: &str) {
        while let Ok(reply) = rx.try_recv() { self.apply(reply, api_url); }
    }

    fn type_char(&mut self, c: char) {
        let draft = self.client.board_mut().draft_mut();
        match self.field { ActiveField::Title => draft.title.push(c), ActiveField::Description => draft.text.push(c) }
    }

    fn backspace(&mut self) {
        let draft = self.client.board_mut().draft_mut();
        match self.field { ActiveField::Title => { draft.title.pop(); }, ActiveField::Description => { draft.text.pop(); } }
    }

    fn switch_field(&mut self) {
        self.field = match self.field { ActiveField::Title => ActiveField::Description, ActiveField::Description => ActiveField::Title };
    }
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, client: TodoClient<HttpTodoApi>, api_url: &str) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut app = App { client, selected: 0, last_tick: Instant::now(), list_state: ListState::default(), creating: false, field: ActiveField::Title, notice: None };
    // Requests run on their own tasks; the loop keeps drawing and reading keys until replies land.
    let (tx, mut rx) = mpsc::unbounded_channel();
    app.client.start_load();
    spawn_load(app.client.api().clone(), tx.clone());

    loop {
        app.drain(&mut rx, api_url);
        terminal.draw(|f| draw(f, &mut app, api_url))?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode() {
                    Mode::View => {
                        let target = app.selected_todo().map(|t| t.id);
                        match key.code {
                            KeyCode::Char('q') => break,
                            KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } }
                            KeyCode::Down => { if app.selected + 1 < app.client.board().len() { app.selected += 1; } }
                            KeyCode::Char(' ') => { if let Some(id) = target { let r = app.client.board_mut().toggle_complete(id); app.report(r); } }
                            KeyCode::Char('n') if app.client.board().is_loading() => { app.notice = Some("still loading".into()); }
                            KeyCode::Char('n') => {
                                app.creating = true;
                                app.field = ActiveField::Title;
                                app.client.board_mut().clear_draft();
                                app.notice = None;
                            }
                            KeyCode::Char('e') => {
                                if let Some(id) = target {
                                    let r = app.client.board_mut().begin_edit(id);
                                    app.field = ActiveField::Title;
                                    app.report(r);
                                }
                            }
                            KeyCode::Char('d') => { if let Some(id) = target { let r = app.client.board_mut().request_remove(id); app.report(r); } }
                            KeyCode::Char('c') => { let r = app.client.board_mut().remove_completed(); app.report(r); }
                            KeyCode::Char('a') => { let r = app.client.board_mut().mark_all_complete(); app.report(r); }
                            KeyCode::Char('u') => { let r = app.client.board_mut().mark_all_incomplete(); app.report(r); }
                            KeyCode::Char('X') => { let r = app.client.board_mut().request_remove_all(); app.report(r); }
                            _ => {}
                        }
                    }
                    Mode::Create => match key.code {
                        KeyCode::Esc => { app.creating = false; app.client.board_mut().clear_draft(); }
                        KeyCode::Enter => {
                            match app.client.start_submit() {
                                Ok(pending) => {
                                    app.creating = false;
                                    app.notice = None;
                                    spawn_create(app.client.api().clone(), pending, tx.clone());
                                }
                                Err(e) => app.notice = Some(e.to_string()),
                            }
                        }
                        KeyCode::Backspace => app.backspace(),
                        KeyCode::Char(c) => app.type_char(c),
                        KeyCode::Tab => app.switch_field(),
                        _ => {}
                    },
                    Mode::Edit => match key.code {
                        KeyCode::Esc => { let r = app.client.board_mut().cancel_edit(); app.report(r); }
                        KeyCode::Enter => { let r = app.client.board_mut().save_edit(); app.report(r); }
                        KeyCode::Backspace => app.backspace(),
                        KeyCode::Char(c) => app.type_char(c),
                        KeyCode::Tab => app.switch_field(),
                        _ => {}
                    },
                    Mode::Confirm => match key.code {
                        KeyCode::Char('y') | KeyCode::Enter => { let r = app.client.board_mut().confirm(); app.report(r); }
                        KeyCode::Char('n') | KeyCode::Esc => { app.client.board_mut().cancel_confirm(); }
                        _ => {}
                    },
                }
                app.clamp_selection();
            }
        }
        if app.last_tick.elapsed() >= tick_rate {
            app.last_tick = Instant::now();
        }
    }
    Ok(())
}

fn draw(f: &mut Frame, app: &mut App, api_url: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(4)])
        .split(f.size());

    let header = Paragraph::new("Space: toggle  n: new  e: edit  d: remove  c: remove completed  a/u: mark all complete/incomplete  X: remove all  q: quit")
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Todo List"));
    f.render_widget(header, chunks[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let board = app.client.board();
    let list_block = Block::default().borders(Borders::ALL).title(format!("items [{}]", board.len()));
    if board.is_loading() {
        f.render_widget(Paragraph::new("Loading...").block(list_block), middle[0]);
    } else if board.is_empty() {
        f.render_widget(Paragraph::new("Empty Todo").style(Style::default().fg(Color::Magenta)).block(list_block), middle[0]);
    } else {
        let editing = match board.edit_state() { EditState::Editing(id) => Some(id), EditState::Idle => None };
        let list_items: Vec<ListItem> = board.todos().map(|t| {
            let mark = if t.completed { "[x]" } else { "[ ]" };
            let pencil = if editing == Some(t.id) { " (editing)" } else { "" };
            let style = if t.completed { Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM) } else { Style::default() };
            ListItem::new(format!("{mark} {}{pencil}", t.title)).style(style)
        }).collect();
        let list = List::new(list_items)
            .block(list_block)
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
            .highlight_symbol(">> ");
        f.render_stateful_widget(list, middle[0], &mut app.list_state);
    }

    let detail = app.selected_todo().map(|t| {
        let text = t.text.clone().unwrap_or_else(|| "(no description)".to_string());
        let created = t.created_at.with_timezone(&Local).format("%B %-d, %Y, %-I:%M %p");
        format!("{}\n\n{}\n\nStatus: {}\n\nDate Created: {}", t.title, text, if t.completed { "Complete" } else { "Incomplete" }, created)
    }).unwrap_or_default();
    let details = Paragraph::new(detail)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("details"));
    f.render_widget(details, middle[1]);

    let mode = app.mode();
    let draft = app.client.board().draft();
    let field_label = match app.field { ActiveField::Title => "Title (Required)", ActiveField::Description => "Description (Optional)" };
    let footer_text = match mode {
        Mode::View | Mode::Confirm => format!(
            "API {api_url}{}\n{}",
            if app.client.board().is_submitting() { "  (saving new todo...)" } else { "" },
            app.notice.as_deref().unwrap_or(""),
        ),
        Mode::Create | Mode::Edit => format!(
            "Title: {}\nDescription: {}\n{field_label} <  Tab to switch, Enter to {}, Esc to cancel  {}",
            draft.title, draft.text,
            if mode == Mode::Edit { "save edit" } else { "add todo" },
            app.notice.as_deref().unwrap_or(""),
        ),
    };
    let footer = Paragraph::new(footer_text)
        .block(Block::default().borders(Borders::ALL).title(match mode { Mode::View | Mode::Confirm => "info", Mode::Create => "add todo", Mode::Edit => "edit todo" }));
    f.render_widget(footer, chunks[2]);

    if let Some(confirm) = app.client.board().pending_confirm() {
        let (heading, body) = match confirm {
            Confirm::RemoveOne(_) => ("Remove Todo", "Would you like to Remove this Todo?"),
            Confirm::RemoveAll => ("Remove all Todos", "Would you like to Remove all Todos?"),
        };
        let area = centered(f.size(), 50, 5);
        f.render_widget(Clear, area);
        let modal = Paragraph::new(format!("{body}\n\n[y] Confirm   [n] Cancel"))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(heading).border_style(Style::default().fg(Color::Red)));
        f.render_widget(modal, area);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect { x: area.x + (area.width - width) / 2, y: area.y + (area.height - height) / 2, width, height }
}
