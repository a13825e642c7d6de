//! Glassfeed TUI Simulator
//!
//! Renders the on-glass container set in a terminal and maps keys onto hub
//! input events, driving the same controller that runs against a real
//! device bridge.
//!
//! Keys: Up/Down move the list cursor or send swipe events, Enter taps,
//! Tab double-taps (back), f cycles feeds, r reloads the current feed,
//! q quits. Set `GLASSFEED_PROXY_URL` to a running request-forwarding
//! proxy endpoint.

use std::collections::HashMap;
use std::io::{self, Stdout};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};

use glassfeed_client::{
    DeviceStatus, GlassFeedError, HubBridge, HubEvent, PageSpec, RedditClient, RedditController,
    Result, FEED_OPTIONS, SCREEN_HEIGHT, SCREEN_WIDTH,
};

const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:5173/__reddit_proxy";

// ============================================================================
// Simulator bridge
// ============================================================================

/// In-process stand-in for the device bridge: keeps the last rendered page
/// for the draw loop and backs local storage with a plain map.
#[derive(Clone, Default)]
struct SimBridge {
    screen: Arc<Mutex<PageSpec>>,
    storage: Arc<Mutex<HashMap<String, String>>>,
}

impl SimBridge {
    fn current_page(&self) -> PageSpec {
        self.screen
            .lock()
            .map(|page| page.clone())
            .unwrap_or_default()
    }
}

fn lock_error() -> GlassFeedError {
    GlassFeedError::Bridge {
        message: "simulator lock poisoned".to_string(),
    }
}

impl HubBridge for SimBridge {
    fn create_startup_page(&mut self, spec: &PageSpec) -> Result<i32> {
        *self.screen.lock().map_err(|_| lock_error())? = spec.clone();
        Ok(0)
    }

    fn rebuild_page(&mut self, spec: &PageSpec) -> Result<()> {
        *self.screen.lock().map_err(|_| lock_error())? = spec.clone();
        Ok(())
    }

    fn get_local_storage(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self
            .storage
            .lock()
            .map_err(|_| lock_error())?
            .get(key)
            .cloned())
    }

    fn set_local_storage(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage
            .lock()
            .map_err(|_| lock_error())?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// Terminal Setup
// ============================================================================

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

// ============================================================================
// UI Rendering
// ============================================================================

/// Map device-pixel geometry (576x288) onto a terminal rect.
fn scale_rect(glass: Rect, x: u16, y: u16, width: u16, height: u16) -> Rect {
    let sx = |v: u16| glass.x + (u32::from(v) * u32::from(glass.width) / u32::from(SCREEN_WIDTH)) as u16;
    let sy = |v: u16| glass.y + (u32::from(v) * u32::from(glass.height) / u32::from(SCREEN_HEIGHT)) as u16;
    let right = sx(x.saturating_add(width)).min(glass.x + glass.width);
    let bottom = sy(y.saturating_add(height)).min(glass.y + glass.height);
    let left = sx(x);
    let top = sy(y);
    Rect {
        x: left,
        y: top,
        width: right.saturating_sub(left),
        height: bottom.saturating_sub(top),
    }
}

fn render_page(f: &mut Frame, glass: Rect, page: &PageSpec, list_cursor: usize) {
    for text in &page.texts {
        // Off-screen parking slots never reach the terminal.
        if text.y >= SCREEN_HEIGHT {
            continue;
        }
        let area = scale_rect(glass, text.x, text.y, text.width, text.height);
        if area.width == 0 || area.height == 0 {
            continue;
        }

        let selected = text.border_width > 0;
        let mut paragraph = Paragraph::new(text.content.as_str()).wrap(Wrap { trim: true });
        if selected {
            paragraph = paragraph.block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
        }
        f.render_widget(paragraph, area);
    }

    for list in &page.lists {
        let area = scale_rect(glass, list.x, list.y, list.width, list.height);
        let items: Vec<ListItem> = list
            .item_names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let style = if list.select_border && i == list_cursor {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(name.as_str()).style(style)
            })
            .collect();
        let widget = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", list.name)),
        );
        f.render_widget(widget, area);
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, status: Option<&str>, log_line: Option<&str>) {
    let (text, style) = match (status, log_line) {
        (Some(error), _) => (format!(" Error: {error}"), Style::default().fg(Color::Red)),
        (None, Some(line)) => (format!(" {line}"), Style::default().fg(Color::Green)),
        (None, None) => (" Ready".to_string(), Style::default().fg(Color::Green)),
    };
    let status = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(status, area);
}

fn render(
    f: &mut Frame,
    page: &PageSpec,
    list_cursor: usize,
    status: Option<&str>,
    log_line: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(10),   // Glass display
            Constraint::Length(2), // Status bar
            Constraint::Length(1), // Help
        ])
        .split(f.area());

    let frame_block = Block::default()
        .borders(Borders::ALL)
        .title(" glass display 576x288 ");
    let glass = frame_block.inner(chunks[0]);
    f.render_widget(frame_block, chunks[0]);
    render_page(f, glass, page, list_cursor);

    render_status_bar(f, chunks[1], status, log_line);

    let help = Paragraph::new("Up/Down: move | Enter: tap | Tab: back | f: next feed | r: reload | q: quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[2]);
}

// ============================================================================
// Event Handling
// ============================================================================

struct SimState {
    list_cursor: usize,
    status: Option<String>,
    should_quit: bool,
}

fn handle_key(
    code: KeyCode,
    page: &PageSpec,
    controller: &mut RedditController<SimBridge, RedditClient>,
    state: &mut SimState,
) {
    let on_list = !page.lists.is_empty();

    let outcome = match code {
        KeyCode::Char('q') => {
            state.should_quit = true;
            Ok(())
        }
        KeyCode::Up if on_list => {
            state.list_cursor = state.list_cursor.saturating_sub(1);
            Ok(())
        }
        KeyCode::Down if on_list => {
            let max = page.lists[0].item_names.len().saturating_sub(1);
            state.list_cursor = (state.list_cursor + 1).min(max);
            Ok(())
        }
        KeyCode::Enter if on_list => {
            controller.handle_event(&HubEvent::list_click(state.list_cursor as i64))
        }
        KeyCode::Up => controller.handle_event(&HubEvent::scroll_up()),
        KeyCode::Down => controller.handle_event(&HubEvent::scroll_down()),
        KeyCode::Enter => controller.handle_event(&HubEvent::click()),
        KeyCode::Tab => controller.handle_event(&HubEvent::double_click()),
        KeyCode::Char('f') => {
            let current = FEED_OPTIONS
                .iter()
                .position(|feed| *feed == controller.current_feed())
                .unwrap_or(0);
            controller.select_feed((current + 1) % FEED_OPTIONS.len())
        }
        KeyCode::Char('r') => controller.reload_feed(),
        _ => Ok(()),
    };

    state.status = outcome.err().map(|e| e.to_string());
}

// ============================================================================
// Main Application
// ============================================================================

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let proxy_url =
        std::env::var("GLASSFEED_PROXY_URL").unwrap_or_else(|_| DEFAULT_PROXY_URL.to_string());

    let bridge = SimBridge::default();
    let client = RedditClient::new(&proxy_url)?;
    let mut controller = RedditController::new(bridge.clone(), client);
    controller.note_device_status(&DeviceStatus {
        connected: true,
        serial: Some("SIM-0001".to_string()),
    });

    let mut terminal = setup_terminal()?;

    let mut state = SimState {
        list_cursor: 0,
        status: None,
        should_quit: false,
    };
    if let Err(e) = controller.init() {
        state.status = Some(format!("init failed: {e}"));
    }
    let mut was_on_list = false;

    loop {
        let page = bridge.current_page();

        // Entering a list page adopts the controller's cursor position.
        let on_list = !page.lists.is_empty();
        if on_list && !was_on_list {
            state.list_cursor = controller.selected_index();
        }
        was_on_list = on_list;

        let log_line = controller.event_log().last().map(str::to_string);
        terminal.draw(|f| {
            render(
                f,
                &page,
                state.list_cursor,
                state.status.as_deref(),
                log_line.as_deref(),
            )
        })?;

        if state.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                handle_key(key.code, &page, &mut controller, &mut state);
            }
        }
    }

    restore_terminal(&mut terminal)?;

    Ok(())
}
