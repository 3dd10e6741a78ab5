use crate::services::scheduler::ScheduledTask;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub const COPIED_ICON: &str = "fa-check";
pub const ICON_RESTORE_DELAY: Duration = Duration::from_millis(2000);

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), String>;
}

/// Account numbers are displayed in blocks (`1234 5678 90`); transfers need them bare.
pub fn normalize_account_number(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// One "copy account number" button and its icon feedback.
pub struct AccountCopier<C> {
    clipboard: Arc<C>,
    icon: Arc<Mutex<String>>,
    original_icon: String,
    restore: Mutex<Option<ScheduledTask>>,
}

impl<C: Clipboard> AccountCopier<C> {
    pub fn new(clipboard: Arc<C>, icon: impl Into<String>) -> Self {
        let icon = icon.into();
        Self {
            clipboard,
            icon: Arc::new(Mutex::new(icon.clone())),
            original_icon: icon,
            restore: Mutex::new(None),
        }
    }

    pub fn icon(&self) -> String {
        self.icon.lock().clone()
    }

    /// Copies the normalized number; on success the icon shows a check for a while.
    pub async fn copy(&self, displayed: &str) -> bool {
        let number = normalize_account_number(displayed);

        if let Err(e) = self.clipboard.write_text(&number).await {
            error!("Gagal menyalin: {}", e);
            return false;
        }

        info!("Copied account number {}", number);
        *self.icon.lock() = COPIED_ICON.to_string();

        let icon = Arc::clone(&self.icon);
        let original = self.original_icon.clone();
        let task = ScheduledTask::after(ICON_RESTORE_DELAY, move || *icon.lock() = original);
        if let Some(previous) = self.restore.lock().replace(task) {
            previous.cancel();
        }
        true
    }
}
