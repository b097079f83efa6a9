//! Welli Clinician Assistant — interactive Ratatui chat panel
//!
//! Layout:
//!   ┌─── header ──────────────────────────────────────────────────────────┐
//!   │  [Tab] AI Diagnostic Assistant | AI Medical Assistant   patient    │
//!   ├─── conversation ────────────────────────────────────────────────────┤
//!   │  AI Assistant 10:42                                                 │
//!   │  I'm analyzing Sarah Johnson's medical history ...                  │
//!   ├─── suggested questions (until the first message) ───────────────────┤
//!   ├─── input ───────────────────────────────────────────────────────────┤
//!   │  footer (key bindings + disclaimer)                                 │
//!   └─────────────────────────────────────────────────────────────────────┘
//!
//! Usage: `welli-tui [config.toml]`

use std::{
    io,
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};

use welli_contracts::{
    error::WelliResult,
    message::{ChatMessage, ChatRole},
    session::SubmitOutcome,
};
use welli_core::{config::AssistantConfig, traits::Responder};
use welli_ref_dashboard::{
    mock_data::{patient_directory, Patient},
    ChatSurface, SurfaceKind,
};
use welli_responder::KeywordResponder;

// ── App state ─────────────────────────────────────────────────────────────────

struct App {
    config: AssistantConfig,
    patient_responder: Arc<dyn Responder>,
    medical_responder: Arc<dyn Responder>,

    patients: Vec<Patient>,
    patient_index: usize,

    surface: ChatSurface,
    input: String,

    // Lines scrolled up from the bottom of the conversation.
    scroll_back: u16,
    // Drives the pending indicator's dots.
    started: Instant,
    // Last rejected action, shown in the footer until the next key.
    notice: Option<String>,
}

impl App {
    fn new(config: AssistantConfig) -> WelliResult<Self> {
        let patient_responder: Arc<dyn Responder> =
            Arc::new(KeywordResponder::for_patient_panel(&config)?);
        let medical_responder: Arc<dyn Responder> =
            Arc::new(KeywordResponder::for_medical_page(&config)?);
        let patients = patient_directory();

        let surface = ChatSurface::patient_panel(&patients[0], Arc::clone(&patient_responder), &config);

        Ok(Self {
            config,
            patient_responder,
            medical_responder,
            patients,
            patient_index: 0,
            surface,
            input: String::new(),
            scroll_back: 0,
            started: Instant::now(),
            notice: None,
        })
    }

    fn current_patient(&self) -> &Patient {
        &self.patients[self.patient_index]
    }

    /// Replace the open surface. Closing the old one drops its pending reply.
    fn open(&mut self, kind: SurfaceKind) {
        self.surface.close();
        self.surface = match kind {
            SurfaceKind::PatientPanel => ChatSurface::patient_panel(
                &self.patients[self.patient_index],
                Arc::clone(&self.patient_responder),
                &self.config,
            ),
            SurfaceKind::MedicalPage => {
                ChatSurface::medical_page(Arc::clone(&self.medical_responder), &self.config)
            }
        };
        self.input.clear();
        self.scroll_back = 0;
    }

    fn toggle_surface(&mut self) {
        let next = match self.surface.kind() {
            SurfaceKind::PatientPanel => SurfaceKind::MedicalPage,
            SurfaceKind::MedicalPage => SurfaceKind::PatientPanel,
        };
        self.open(next);
    }

    fn step_patient(&mut self, forward: bool) {
        if self.surface.kind() != SurfaceKind::PatientPanel {
            return;
        }
        let len = self.patients.len();
        self.patient_index = if forward {
            (self.patient_index + 1) % len
        } else {
            (self.patient_index + len - 1) % len
        };
        self.open(SurfaceKind::PatientPanel);
    }

    /// Digits pick a suggestion only while the list is shown and nothing is typed.
    fn suggestion_key(&self, c: char) -> Option<usize> {
        if !self.input.is_empty() || !self.surface.suggestions_visible() {
            return None;
        }
        suggestion_index(c, self.surface.kind().suggestions().len())
    }

    fn submit_input(&mut self) {
        let text = std::mem::take(&mut self.input);
        let result = self.surface.send(&text);
        self.record(result, text);
    }

    fn submit_suggestion(&mut self, index: usize) {
        let result = self.surface.send_suggestion(index);
        self.record(result, String::new());
    }

    fn record(&mut self, result: WelliResult<SubmitOutcome>, unsent: String) {
        match result {
            Ok(SubmitOutcome::Accepted) => self.scroll_back = 0,
            Ok(SubmitOutcome::EmptyMessage) => {}
            Ok(SubmitOutcome::Busy) => {
                // Keep what was typed so it can be sent once the reply lands.
                self.input = unsent;
                self.notice = Some("Waiting for the assistant to reply".to_string());
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn ui(f: &mut Frame, app: &App) {
    let full = f.area();
    let suggestion_height = if app.surface.suggestions_visible() {
        app.surface.kind().suggestions().len() as u16 + 2
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                 // header
            Constraint::Min(6),                    // conversation
            Constraint::Length(suggestion_height), // suggestions
            Constraint::Length(3),                 // input
            Constraint::Length(4),                 // footer
        ])
        .split(full);

    render_header(f, chunks[0], app);
    render_messages(f, chunks[1], app);
    if suggestion_height > 0 {
        render_suggestions(f, chunks[2], app);
    }
    render_input(f, chunks[3], app);
    render_footer(f, chunks[4], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut spans: Vec<Span> = vec![Span::styled("Welli    ", title_style)];

    for kind in [SurfaceKind::PatientPanel, SurfaceKind::MedicalPage] {
        let style = if app.surface.kind() == kind {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {} ", kind.title()), style));
        spans.push(Span::raw("  "));
    }

    if app.surface.kind() == SurfaceKind::PatientPanel {
        let p = app.current_patient();
        spans.push(Span::styled(
            format!("  {} · {} · {}", p.name, p.age, p.condition),
            Style::default().fg(Color::Gray),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(header, area);
}

fn message_lines(message: &ChatMessage) -> Vec<Line<'static>> {
    let (label_color, body_color) = match message.role {
        ChatRole::User => (Color::Cyan, Color::White),
        ChatRole::Assistant => (Color::Green, Color::Gray),
    };
    let sent_at = message.sent_at.with_timezone(&Local).format("%H:%M");

    let mut lines = vec![Line::from(vec![
        Span::styled(
            message.role.label(),
            Style::default().fg(label_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", sent_at), Style::default().fg(Color::DarkGray)),
    ])];
    for text in message.content.lines() {
        lines.push(Line::from(Span::styled(
            text.to_string(),
            Style::default().fg(body_color),
        )));
    }
    lines.push(Line::from(""));
    lines
}

fn render_messages(f: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = app.surface.messages().iter().flat_map(message_lines).collect();

    if app.surface.is_analyzing() {
        let dots = (app.started.elapsed().as_millis() / 400 % 4) as usize;
        lines.push(Line::from(Span::styled(
            format!("{}{}", app.surface.kind().pending_label(), ".".repeat(dots)),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )));
    }

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let total = wrapped_height(&lines, inner_width);
    let bottom = total.saturating_sub(inner_height);
    let offset = bottom.saturating_sub(app.scroll_back);

    let block = Block::default()
        .title(format!(" {}: {} ", app.surface.kind().title(), app.surface.subject()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    f.render_widget(paragraph, area);
}

fn render_suggestions(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .surface
        .kind()
        .suggestions()
        .iter()
        .enumerate()
        .map(|(i, suggestion)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("  [{}] ", i + 1), Style::default().fg(Color::Cyan)),
                Span::raw(*suggestion),
            ]))
        })
        .collect();

    let block = Block::default()
        .title(" Suggested questions ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(List::new(items).block(block), area);
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let (text, style) = if app.input.is_empty() {
        let hint = match app.surface.kind() {
            SurfaceKind::PatientPanel => "Ask about symptoms, diagnosis, or treatment...",
            SurfaceKind::MedicalPage => "Type your medical question...",
        };
        (hint.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (format!("{}█", app.input), Style::default().fg(Color::White))
    };

    let input = Paragraph::new(Span::styled(text, style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(input, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let key = Style::default().fg(Color::Cyan);
    let mut spans: Vec<Span> = vec![
        Span::styled(" [Enter] ", key),
        Span::raw("Send  "),
        Span::styled("[Tab] ", key),
        Span::raw("Switch surface  "),
    ];
    if app.surface.kind() == SurfaceKind::PatientPanel {
        spans.push(Span::styled("[←/→] ", key));
        spans.push(Span::raw("Patient  "));
    }
    if app.surface.suggestions_visible() {
        spans.push(Span::styled("[1-5] ", key));
        spans.push(Span::raw("Suggestion  "));
    }
    spans.push(Span::styled("[PgUp/PgDn] ", key));
    spans.push(Span::raw("Scroll  "));
    spans.push(Span::styled("[Esc] ", key));
    spans.push(Span::raw("Quit"));

    let second = match &app.notice {
        Some(notice) => Line::from(Span::styled(format!(" {}", notice), Style::default().fg(Color::Red))),
        None => Line::from(Span::styled(
            format!(" {}", app.surface.kind().disclaimer()),
            Style::default().fg(Color::DarkGray),
        )),
    };

    let footer = Paragraph::new(vec![Line::from(spans), second]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}

// ── Utility helpers ───────────────────────────────────────────────────────────

/// Zero-based suggestion for key `c`, when `c` is a listed number.
fn suggestion_index(c: char, count: usize) -> Option<usize> {
    let n = c.to_digit(10)? as usize;
    (1..=count).contains(&n).then(|| n - 1)
}

/// Rows `lines` occupy once wrapped to `width` columns.
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn load_config() -> io::Result<AssistantConfig> {
    let config = match std::env::args().nth(1) {
        Some(path) => AssistantConfig::from_file(Path::new(&path)),
        None => Ok(AssistantConfig::default()),
    };
    config.map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))
}

// ── Terminal setup / teardown ─────────────────────────────────────────────────

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

// ── Main event loop ───────────────────────────────────────────────────────────

fn main() -> io::Result<()> {
    let config = load_config()?;

    // Replies are produced by tasks on this runtime; the draw loop stays synchronous.
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let mut app = App::new(config)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let mut terminal = setup_terminal()?;

    // Short poll so the pending indicator animates and replies show promptly.
    const TICK: Duration = Duration::from_millis(100);

    loop {
        terminal.draw(|f| ui(f, &app))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        app.notice = None;

        match key.code {
            KeyCode::Esc => break,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,

            KeyCode::Tab => app.toggle_surface(),
            KeyCode::Left => app.step_patient(false),
            KeyCode::Right => app.step_patient(true),
            KeyCode::PageUp => app.scroll_back = app.scroll_back.saturating_add(5),
            KeyCode::PageDown => app.scroll_back = app.scroll_back.saturating_sub(5),

            KeyCode::Enter => app.submit_input(),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Char(c) => match app.suggestion_key(c) {
                Some(index) => app.submit_suggestion(index),
                None => app.input.push(c),
            },
            _ => {}
        }
    }

    app.surface.close();
    restore_terminal(&mut terminal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use ratatui::text::Line;

    use super::{suggestion_index, wrapped_height};

    #[test]
    fn only_listed_numbers_pick_suggestions() {
        assert_eq!(suggestion_index('1', 5), Some(0));
        assert_eq!(suggestion_index('5', 5), Some(4));
        for c in ['0', '6', '9', 'a', ' '] {
            assert_eq!(suggestion_index(c, 5), None, "key {c:?}");
        }
        assert_eq!(suggestion_index('3', 2), None);
    }

    #[test]
    fn wrapped_height_counts_blank_lines_and_wraps() {
        let lines = vec![Line::from("abcdefghij"), Line::from(""), Line::from("abc")];
        assert_eq!(wrapped_height(&lines, 4), 3 + 1 + 1);
        assert_eq!(wrapped_height(&lines, 0), 10 + 1 + 3);
    }
}
