use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, InputMode, Screen};
use crate::dashboard::DashboardField;
use crate::input::TextInput;
use crate::model::{Message, Sender};

const BUTTON_WIDTH: u16 = 7;
const BUTTON_HEIGHT: u16 = 3;
const WINDOW_WIDTH: u16 = 60;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Widget => render_widget_screen(app, frame, body_area),
        Screen::Dashboard => render_dashboard_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Shop Agent ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("{} ", app.backend.base_url()),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Widget => " WIDGET ",
        Screen::Dashboard => " DASHBOARD ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |k: &'static str, label: &'static str| {
        [Span::styled(k, key_style), Span::styled(label, label_style)]
    };

    let hints: Vec<Span> = match (app.screen, app.input_mode) {
        (Screen::Widget, InputMode::Normal) => {
            let mut hints = Vec::new();
            hints.extend(hint(" o ", if app.widget.is_open { " close " } else { " open " }));
            hints.extend(hint(" i ", " type "));
            if app.widget.is_open && app.widget.selected_carousel().is_some() {
                hints.extend(hint(" h/l ", " products "));
                hints.extend(hint(" [/] ", " carousel "));
            }
            if app.widget.is_open {
                hints.extend(hint(" j/k ", " scroll "));
            }
            hints.extend(hint(" Tab ", " dashboard "));
            hints.extend(hint(" q ", " quit "));
            hints
        }
        (Screen::Widget, InputMode::Editing) => {
            let mut hints = Vec::new();
            hints.extend(hint(" Enter ", " send "));
            hints.extend(hint(" Esc ", " stop typing "));
            hints
        }
        (Screen::Dashboard, InputMode::Normal) => {
            let mut hints = Vec::new();
            hints.extend(hint(" j/k ", " field "));
            hints.extend(hint(" i ", " edit "));
            hints.extend(hint(" s ", " sync catalog "));
            hints.extend(hint(" Tab ", " widget "));
            hints.extend(hint(" q ", " quit "));
            hints
        }
        (Screen::Dashboard, InputMode::Editing) => {
            let mut hints = Vec::new();
            hints.extend(hint(" Tab ", " next field "));
            hints.extend(hint(" Enter ", " sync "));
            hints.extend(hint(" Esc ", " done "));
            hints
        }
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_widget_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    // Host "page" behind the floating widget
    let backdrop = Paragraph::new(Span::styled(
        "Press o to open the shopping assistant.",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(backdrop, area);

    // Floating button, bottom-right
    let button_area = Rect::new(
        area.x + area.width.saturating_sub(BUTTON_WIDTH + 1),
        area.y + area.height.saturating_sub(BUTTON_HEIGHT),
        BUTTON_WIDTH.min(area.width),
        BUTTON_HEIGHT.min(area.height),
    );
    let button_label = if app.widget.is_open { "✕" } else { "💬" };
    let button = Paragraph::new(Line::from(button_label).centered())
        .style(Style::default().fg(Color::White).bg(Color::Black))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(Clear, button_area);
    frame.render_widget(button, button_area);

    if !app.widget.is_open {
        app.chat_area = None;
        return;
    }

    // Window sits above the button
    let width = WINDOW_WIDTH.min(area.width.saturating_sub(2));
    let height = area.height.saturating_sub(BUTTON_HEIGHT + 1);
    let window_area = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y,
        width,
        height,
    );
    render_chat_window(app, frame, window_area);
}

fn render_chat_window(app: &mut App, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);

    let window = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Shopping Assistant ".bold());
    let inner = window.inner(area);
    frame.render_widget(window, area);

    let card_height = if app.widget.selected_carousel().is_some() { 6 } else { 0 };
    let [thread_area, card_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(card_height),
        Constraint::Length(3),
    ])
    .areas(inner);

    app.chat_area = Some(thread_area);
    app.chat_height = thread_area.height;
    app.chat_width = thread_area.width;

    render_thread(app, frame, thread_area);
    if card_height > 0 {
        render_product_card(app, frame, card_area);
    }
    render_chat_input(app, frame, input_area);
}

fn render_thread(app: &App, frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    for msg in &app.widget.messages {
        lines.extend(message_lines(app, msg));
    }

    if app.widget.loading {
        lines.push(Line::from(Span::styled(
            "Assistant:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let thread = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(thread, area);
}

fn message_lines<'a>(app: &App, msg: &'a Message) -> Vec<Line<'a>> {
    let mut lines = Vec::new();

    let (label, color) = match msg.sender {
        Sender::User => ("You:", Color::Cyan),
        Sender::Assistant => ("Assistant:", Color::Yellow),
    };
    let label_line = Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ));
    lines.push(if msg.is_user() {
        label_line.right_aligned()
    } else {
        label_line
    });

    for text_line in msg.text.lines() {
        let line = Line::from(text_line);
        lines.push(if msg.is_user() { line.right_aligned() } else { line });
    }

    if msg.has_products() {
        let index = app.widget.carousel_index(msg.id).unwrap_or(0);
        let selected = app.widget.selected_carousel() == Some(msg.id);
        let marker = if selected { "▶" } else { " " };
        lines.push(Line::from(Span::styled(
            format!(
                "{} {} products ({}/{})",
                marker,
                msg.products.len(),
                index + 1,
                msg.products.len()
            ),
            Style::default().fg(Color::Magenta),
        )));
    }

    lines.push(Line::default());
    lines
}

fn render_product_card(app: &App, frame: &mut Frame, area: Rect) {
    let Some(id) = app.widget.selected_carousel() else {
        return;
    };
    let (Some(product), Some(index), Some(msg)) = (
        app.widget.current_product(id),
        app.widget.carousel_index(id),
        app.widget.message(id),
    ) else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(format!(" ◀ {}/{} ▶ ", index + 1, msg.products.len()));

    let mut lines = vec![Line::from(Span::styled(
        product.title.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    if let Some(price) = &product.price {
        lines.push(Line::from(Span::styled(
            format!("${}", price),
            Style::default().fg(Color::Green),
        )));
    }

    let link = app.config.effective_shop_domain().and_then(|domain| {
        product
            .product_url(domain)
            .or_else(|| product.cart_permalink(domain))
    });
    if let Some(url) = link.or_else(|| product.image_url.clone()) {
        lines.push(Line::from(Span::styled(
            url,
            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        )));
    }

    let card = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(card, area);
}

fn render_chat_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner_width = area.width.saturating_sub(2) as usize;
    let content = if app.widget.input.value().is_empty() && !editing {
        Span::styled("Ask about products...", Style::default().fg(Color::DarkGray))
    } else {
        let (visible, _) = app.widget.input.visible(inner_width);
        Span::styled(visible, Style::default().fg(Color::Cyan))
    };
    frame.render_widget(Paragraph::new(Line::from(content)).block(block), area);

    if editing {
        set_input_cursor(frame, &app.widget.input, area, inner_width);
    }
}

fn set_input_cursor(frame: &mut Frame, input: &TextInput, area: Rect, inner_width: usize) {
    let (_, cursor_col) = input.visible(inner_width);
    frame.set_cursor_position((area.x + 1 + cursor_col as u16, area.y + 1));
}

fn render_dashboard_screen(app: &App, frame: &mut Frame, area: Rect) {
    let [config_area, conversations_area] = Layout::vertical([
        Constraint::Length(13),
        Constraint::Min(0),
    ])
    .areas(area);

    let config_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Configuration ");
    let inner = config_block.inner(config_area);
    frame.render_widget(config_block, config_area);

    let [shop_label, shop_input, token_label, token_input, button_area, status_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .areas(inner);

    let dashboard = &app.dashboard;
    let editing = app.input_mode == InputMode::Editing;

    frame.render_widget(Paragraph::new("Shopify URL:"), shop_label);
    render_form_field(
        frame,
        shop_input,
        &dashboard.shop_url,
        None,
        "my-shop.myshopify.com",
        dashboard.focus == DashboardField::ShopUrl,
        editing,
    );

    frame.render_widget(Paragraph::new("Admin API Token:"), token_label);
    let masked = dashboard.masked_token();
    render_form_field(
        frame,
        token_input,
        &dashboard.api_token,
        Some(masked.as_str()),
        "shpat_...",
        dashboard.focus == DashboardField::ApiToken,
        editing,
    );

    let button_style = if dashboard.syncing {
        Style::default().bg(Color::DarkGray).fg(Color::Gray)
    } else {
        Style::default().bg(Color::Blue).fg(Color::White).bold()
    };
    let button = Line::from(vec![
        Span::styled(" Sync Catalog (s) ", button_style),
    ]);
    frame.render_widget(Paragraph::new(button), button_area);

    if !dashboard.status.is_empty() {
        let status = Paragraph::new(Span::styled(dashboard.status.as_str(), Style::default().bold()))
            .wrap(Wrap { trim: true });
        frame.render_widget(status, status_area);
    }

    let conversations = Paragraph::new(Span::styled(
        "No conversations yet.",
        Style::default().fg(Color::DarkGray),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Recent Conversations "),
    );
    frame.render_widget(conversations, conversations_area);
}

fn render_form_field(
    frame: &mut Frame,
    area: Rect,
    input: &TextInput,
    masked: Option<&str>,
    placeholder: &'static str,
    focused: bool,
    editing: bool,
) {
    let border_color = match (focused, editing) {
        (true, true) => Color::Yellow,
        (true, false) => Color::Cyan,
        _ => Color::DarkGray,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner_width = area.width.saturating_sub(2) as usize;
    let content = if input.value().is_empty() {
        Span::styled(placeholder, Style::default().fg(Color::DarkGray))
    } else if let Some(masked) = masked {
        Span::raw(masked.chars().take(inner_width).collect::<String>())
    } else {
        Span::raw(input.visible(inner_width).0)
    };
    frame.render_widget(Paragraph::new(Line::from(content)).block(block), area);

    if focused && editing {
        set_input_cursor(frame, input, area, inner_width);
    }
}
