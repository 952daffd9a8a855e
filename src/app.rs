use std::path::PathBuf;

use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::backend::BackendClient;
use crate::config::Config;
use crate::dashboard::DashboardState;
use crate::error::BackendError;
use crate::model::{ChatReply, SyncReport};
use crate::widget::WidgetState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Widget,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    pub widget: WidgetState,
    pub dashboard: DashboardState,

    // Chat thread scrolling
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the thread, set during render
    pub chat_width: u16,  // inner width, for wrap estimates
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Background requests, polled from the event loop
    pub chat_task: Option<JoinHandle<Result<ChatReply, BackendError>>>,
    pub sync_task: Option<JoinHandle<Result<(String, SyncReport), BackendError>>>,

    // Data
    pub backend: BackendClient,
    pub config: Config,
    /// Where the last shop URL is remembered; `None` keeps it in memory only
    pub config_path: Option<PathBuf>,
}

impl App {
    pub fn new(config: Config, backend: BackendClient) -> Self {
        let dashboard = DashboardState::new(config.shop_url.as_deref());

        Self {
            should_quit: false,
            screen: Screen::Widget,
            input_mode: InputMode::Normal,
            widget: WidgetState::new(),
            dashboard,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            animation_frame: 0,
            chat_task: None,
            sync_task: None,
            backend,
            config,
            config_path: None,
        }
    }

    pub fn switch_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Widget => Screen::Dashboard,
            Screen::Dashboard => Screen::Widget,
        };
        self.input_mode = InputMode::Normal;
    }

    /// Send whatever is in the widget input. Ignored while a reply is pending.
    pub fn send_chat(&mut self) {
        if self.chat_task.is_some() {
            return;
        }
        let Some(mut request) = self.widget.begin_send() else {
            return;
        };
        request.cart_id = self.config.cart_id.clone();
        request.shop_domain = self.config.effective_shop_domain().map(str::to_string);

        self.scroll_chat_to_bottom();

        let backend = self.backend.clone();
        self.chat_task = Some(tokio::spawn(async move { backend.chat(&request).await }));
    }

    /// Start a catalog sync. Ignored while one is running.
    pub fn start_sync(&mut self) {
        if self.sync_task.is_some() {
            return;
        }
        let request = self.dashboard.begin_sync();

        let backend = self.backend.clone();
        self.sync_task = Some(tokio::spawn(async move {
            let result = backend.sync(&request).await;
            result.map(|report| (request.shop_url, report))
        }));
    }

    /// Keep the shop URL of a successful sync in the config file, if there is one.
    fn remember_shop_url(&mut self, shop_url: String) {
        if shop_url.trim().is_empty() {
            return;
        }
        self.config.shop_url = Some(shop_url);
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save_to(path) {
                warn!(error = %e, "could not remember shop url");
            }
        }
    }

    /// Apply results of finished background requests.
    pub async fn poll_tasks(&mut self) {
        if self.chat_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.chat_task.take() {
                match flatten(task.await) {
                    Ok(reply) => {
                        info!(products = reply.products.len(), "assistant replied");
                        self.widget.receive_reply(reply);
                    }
                    Err(e) => {
                        warn!(error = %e, "chat failed");
                        self.widget.receive_failure();
                    }
                }
                self.scroll_chat_to_bottom();
            }
        }

        if self.sync_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.sync_task.take() {
                let result = match flatten(task.await) {
                    Ok((shop_url, report)) => {
                        self.remember_shop_url(shop_url);
                        Ok(report)
                    }
                    Err(e) => {
                        warn!(error = %e, "sync failed");
                        Err(e)
                    }
                };
                self.dashboard.finish_sync(result);
            }
        }
    }

    pub fn has_pending_request(&self) -> bool {
        self.chat_task.is_some() || self.sync_task.is_some()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.has_pending_request() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.thread_bottom());
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    /// Scroll the thread so the newest message (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.thread_bottom();
    }

    /// Largest useful scroll offset: the wrapped thread height minus the view.
    fn thread_bottom(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;
        for msg in &self.widget.messages {
            total_lines = total_lines.saturating_add(1); // sender line
            for line in msg.text.lines() {
                let char_count = line.chars().count();
                total_lines = total_lines.saturating_add(char_count / wrap_width + 1);
            }
            if msg.has_products() {
                total_lines = total_lines.saturating_add(1); // carousel summary line
            }
            total_lines = total_lines.saturating_add(1); // blank line after message
        }
        if self.widget.loading {
            total_lines = total_lines.saturating_add(2);
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        u16::try_from(total_lines)
            .unwrap_or(u16::MAX)
            .saturating_sub(visible_height)
    }
}

/// A panicked request task is just another failed request.
fn flatten<T>(
    joined: Result<Result<T, BackendError>, tokio::task::JoinError>,
) -> anyhow::Result<T> {
    Ok(joined??)
}
