use crate::services::scheduler::ScheduledTask;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::debug;

// Exit animation length; hiding toasts stay attached this long.
pub const HIDE_DELAY: Duration = Duration::from_millis(300);

pub const SUCCESS_DURATION: Duration = Duration::from_millis(3000);
pub const ERROR_DURATION: Duration = Duration::from_millis(4000);
pub const WARNING_DURATION: Duration = Duration::from_millis(3500);
pub const INFO_DURATION: Duration = Duration::from_millis(3000);

const LOADING_ICON: &str = "fa-spinner";
const EVENT_BUFFER: usize = 64;

pub type ToastId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Error,
    Warning,
}

impl Severity {
    pub fn class(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }

    pub fn default_title(self) -> &'static str {
        match self {
            Severity::Info => "Informasi",
            Severity::Success => "Berhasil",
            Severity::Error => "Error",
            Severity::Warning => "Peringatan",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Severity::Info => "fa-info-circle",
            Severity::Success => "fa-check-circle",
            Severity::Error => "fa-times-circle",
            Severity::Warning => "fa-exclamation-triangle",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub title: String,
    pub severity: Severity,
    pub icon: &'static str,
    // zero = persistent
    pub duration: Duration,
    pub loading: bool,
    pub countdown_started: Instant,
    pub role: &'static str,
    pub aria_live: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToastEvent {
    Shown(Toast),
    Updated(Toast),
    Extended(Toast),
    Hiding(ToastId),
    Detached(ToastId),
}

struct ToastEntry {
    toast: Toast,
    timer: Option<ScheduledTask>,
    hiding: bool,
}

struct Registry {
    toasts: DashMap<ToastId, ToastEntry>,
    next_id: AtomicU64,
    events: broadcast::Sender<ToastEvent>,
}

#[derive(Clone)]
pub struct ToastManager {
    registry: Arc<Registry>,
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastManager {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            registry: Arc::new(Registry {
                toasts: DashMap::new(),
                next_id: AtomicU64::new(1),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.registry.events.subscribe()
    }

    pub fn show(
        &self,
        message: impl Into<String>,
        severity: Severity,
        duration: Duration,
        title: Option<&str>,
    ) -> ToastHandle {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            message: message.into(),
            title: title.unwrap_or(severity.default_title()).to_string(),
            severity,
            icon: severity.icon(),
            duration,
            loading: false,
            countdown_started: Instant::now(),
            role: "alert",
            aria_live: "assertive",
        };

        debug!(id, severity = severity.class(), "toast shown: {}", toast.message);
        self.registry.toasts.insert(
            id,
            ToastEntry { toast: toast.clone(), timer: None, hiding: false },
        );

        // Armed only once the entry exists, so the timer always finds it.
        if !duration.is_zero() {
            let timer = self.schedule_removal(id, duration);
            if let Some(mut entry) = self.registry.toasts.get_mut(&id) {
                entry.timer = Some(timer);
            }
        }
        self.registry.emit(ToastEvent::Shown(toast));

        self.handle(id)
    }

    pub fn success(&self, message: impl Into<String>) -> ToastHandle {
        self.show(message, Severity::Success, SUCCESS_DURATION, None)
    }

    pub fn error(&self, message: impl Into<String>) -> ToastHandle {
        self.show(message, Severity::Error, ERROR_DURATION, None)
    }

    pub fn warning(&self, message: impl Into<String>) -> ToastHandle {
        self.show(message, Severity::Warning, WARNING_DURATION, None)
    }

    pub fn info(&self, message: impl Into<String>) -> ToastHandle {
        self.show(message, Severity::Info, INFO_DURATION, None)
    }

    pub fn loading(&self, message: Option<&str>, title: Option<&str>) -> ToastHandle {
        let handle = self.show(
            message.unwrap_or("Memproses..."),
            Severity::Info,
            Duration::ZERO,
            Some(title.unwrap_or("Loading")),
        );

        if let Some(mut entry) = self.registry.toasts.get_mut(&handle.id) {
            entry.toast.loading = true;
            entry.toast.icon = LOADING_ICON;
            let toast = entry.toast.clone();
            drop(entry);
            self.registry.emit(ToastEvent::Updated(toast));
        }

        handle
    }

    pub fn remove(&self, id: ToastId) {
        self.registry.begin_hide(id);
    }

    pub fn update(&self, id: ToastId, message: &str, severity: Option<Severity>) {
        let Some(mut entry) = self.registry.toasts.get_mut(&id) else {
            return;
        };

        if !message.is_empty() {
            entry.toast.message = message.to_string();
        }
        if let Some(severity) = severity {
            entry.toast.severity = severity;
            entry.toast.icon = severity.icon();
        }

        let toast = entry.toast.clone();
        drop(entry);
        self.registry.emit(ToastEvent::Updated(toast));
    }

    // Toasts without a timer (persistent) are left alone.
    pub fn extend(&self, id: ToastId, new_duration: Duration) {
        let Some(mut entry) = self.registry.toasts.get_mut(&id) else {
            return;
        };
        if entry.hiding || entry.timer.is_none() {
            return;
        }

        if let Some(timer) = entry.timer.take() {
            timer.cancel();
        }
        entry.timer = Some(self.schedule_removal(id, new_duration));
        entry.toast.duration = new_duration;
        entry.toast.countdown_started = Instant::now();

        let toast = entry.toast.clone();
        drop(entry);
        self.registry.emit(ToastEvent::Extended(toast));
    }

    pub fn clear_all(&self) {
        let ids: Vec<ToastId> = self
            .registry
            .toasts
            .iter()
            .filter(|entry| !entry.hiding)
            .map(|entry| *entry.key())
            .collect();

        for id in ids {
            self.remove(id);
        }
    }

    pub fn count(&self) -> usize {
        self.registry.toasts.iter().filter(|entry| !entry.hiding).count()
    }

    pub fn is_attached(&self, id: ToastId) -> bool {
        self.registry.toasts.contains_key(&id)
    }

    pub fn get(&self, id: ToastId) -> Option<Toast> {
        self.registry
            .toasts
            .get(&id)
            .filter(|entry| !entry.hiding)
            .map(|entry| entry.toast.clone())
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        let mut toasts: Vec<Toast> = self
            .registry
            .toasts
            .iter()
            .filter(|entry| !entry.hiding)
            .map(|entry| entry.toast.clone())
            .collect();
        toasts.sort_by_key(|toast| toast.id);
        toasts
    }

    fn handle(&self, id: ToastId) -> ToastHandle {
        ToastHandle { id, manager: self.clone() }
    }

    fn schedule_removal(&self, id: ToastId, after: Duration) -> ScheduledTask {
        let registry = Arc::downgrade(&self.registry);
        ScheduledTask::after(after, move || {
            if let Some(registry) = registry.upgrade() {
                registry.begin_hide(id);
            }
        })
    }
}

impl Registry {
    fn emit(&self, event: ToastEvent) {
        // No subscriber is fine, nobody is drawing.
        let _ = self.events.send(event);
    }

    fn begin_hide(self: &Arc<Self>, id: ToastId) {
        let Some(mut entry) = self.toasts.get_mut(&id) else {
            return;
        };
        if entry.hiding {
            return;
        }

        entry.hiding = true;
        if let Some(timer) = entry.timer.take() {
            timer.cancel();
        }
        drop(entry);

        debug!(id, "toast hiding");
        self.emit(ToastEvent::Hiding(id));

        let registry: Weak<Registry> = Arc::downgrade(self);
        ScheduledTask::after(HIDE_DELAY, move || {
            if let Some(registry) = registry.upgrade() {
                registry.detach(id);
            }
        });
    }

    fn detach(&self, id: ToastId) {
        if self.toasts.remove(&id).is_some() {
            self.emit(ToastEvent::Detached(id));
        }
    }
}

#[derive(Clone)]
pub struct ToastHandle {
    id: ToastId,
    manager: ToastManager,
}

impl ToastHandle {
    pub fn id(&self) -> ToastId {
        self.id
    }

    pub fn remove(&self) {
        self.manager.remove(self.id);
    }

    pub fn update(&self, message: &str, severity: Option<Severity>) {
        self.manager.update(self.id, message, severity);
    }

    pub fn extend(&self, new_duration: Duration) {
        self.manager.extend(self.id, new_duration);
    }

    pub fn toast(&self) -> Option<Toast> {
        self.manager.get(self.id)
    }
}

impl std::fmt::Debug for ToastHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastHandle").field("id", &self.id).finish()
    }
}
