//! Dashboard form: shop URL + Admin API token, and the sync status line.

use crate::input::TextInput;
use crate::model::{SyncReport, SyncRequest};

pub const SYNC_IN_PROGRESS: &str = "Syncing products... This may take a while.";
pub const SYNC_FAILED: &str = "Error syncing products.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardField {
    #[default]
    ShopUrl,
    ApiToken,
}

impl DashboardField {
    pub fn next(self) -> Self {
        match self {
            DashboardField::ShopUrl => DashboardField::ApiToken,
            DashboardField::ApiToken => DashboardField::ShopUrl,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub shop_url: TextInput,
    pub api_token: TextInput,
    pub focus: DashboardField,
    /// Empty until the first sync
    pub status: String,
    pub syncing: bool,
}

impl DashboardState {
    pub fn new(saved_shop_url: Option<&str>) -> Self {
        Self {
            shop_url: saved_shop_url.map(TextInput::with_value).unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            DashboardField::ShopUrl => &mut self.shop_url,
            DashboardField::ApiToken => &mut self.api_token,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    /// Fields are sent exactly as typed.
    pub fn begin_sync(&mut self) -> SyncRequest {
        self.status = SYNC_IN_PROGRESS.to_string();
        self.syncing = true;
        SyncRequest {
            shop_url: self.shop_url.value().to_string(),
            api_token: self.api_token.value().to_string(),
        }
    }

    pub fn finish_sync<E>(&mut self, result: Result<SyncReport, E>) {
        self.syncing = false;
        self.status = match result {
            Ok(report) => sync_complete_message(&report),
            Err(_) => SYNC_FAILED.to_string(),
        };
    }

    /// Token as shown on screen
    pub fn masked_token(&self) -> String {
        "*".repeat(self.api_token.char_count())
    }
}

pub fn sync_complete_message(report: &SyncReport) -> String {
    match report.products_indexed {
        Some(count) => format!("Sync complete! {} products indexed.", count),
        None => "Sync complete!".to_string(),
    }
}
