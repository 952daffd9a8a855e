use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, InputMode, Screen};
use crate::input::TextInput;
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
    app.poll_tasks().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match (app.input_mode, app.screen) {
        (InputMode::Normal, Screen::Widget) => handle_widget_normal(app, key),
        (InputMode::Normal, Screen::Dashboard) => handle_dashboard_normal(app, key),
        (InputMode::Editing, Screen::Widget) => handle_widget_editing(app, key),
        (InputMode::Editing, Screen::Dashboard) => handle_dashboard_editing(app, key),
    }
}

/// Keys shared by both screens in normal mode. Returns true if consumed.
fn handle_common_normal(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => app.switch_screen(),
        KeyCode::Char('1') => app.screen = Screen::Widget,
        KeyCode::Char('2') => app.screen = Screen::Dashboard,
        _ => return false,
    }
    true
}

fn handle_widget_normal(app: &mut App, key: KeyEvent) {
    if handle_common_normal(app, key) {
        return;
    }

    match key.code {
        // Floating button
        KeyCode::Char('o') | KeyCode::Char(' ') => app.widget.toggle_open(),
        KeyCode::Esc => app.widget.is_open = false,

        // Start typing (opens the window if needed)
        KeyCode::Char('i') | KeyCode::Enter => {
            app.widget.is_open = true;
            app.input_mode = InputMode::Editing;
        }

        _ if !app.widget.is_open => {}

        // Carousel paging
        KeyCode::Char('h') | KeyCode::Left => app.widget.page_selected_prev(),
        KeyCode::Char('l') | KeyCode::Right => app.widget.page_selected_next(),
        KeyCode::Char('[') => app.widget.select_prev_carousel(),
        KeyCode::Char(']') => app.widget.select_next_carousel(),

        // Thread scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        KeyCode::Char('g') => app.chat_scroll = 0,

        _ => {}
    }
}

fn handle_widget_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.send_chat(),
        _ => edit_text(&mut app.widget.input, key),
    }
}

fn handle_dashboard_normal(app: &mut App, key: KeyEvent) {
    if handle_common_normal(app, key) {
        return;
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Char('k') | KeyCode::Up => {
            app.dashboard.focus_next();
        }
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
        KeyCode::Char('s') => app.start_sync(),
        _ => {}
    }
}

fn handle_dashboard_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Tab | KeyCode::BackTab => app.dashboard.focus_next(),
        // Submitting the form
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.start_sync();
        }
        _ => edit_text(app.dashboard.focused_input(), key),
    }
}

fn edit_text(input: &mut TextInput, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        KeyCode::Char(c) => input.insert(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen != Screen::Widget {
        return;
    }
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_chat_down(3),
        MouseEventKind::ScrollUp => app.scroll_chat_up(3),
        _ => {}
    }
}
