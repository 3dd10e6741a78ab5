//! stdout bindings for the form, receipt and toast surfaces.

use crate::models::payment::FormFields;
use crate::services::account_copy::Clipboard;
use crate::services::payment_form::FormView;
use crate::services::receipt::{PageState, ReceiptFields, ReceiptView};
use crate::services::toast::ToastEvent;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    pub amount: String,
    pub display_amount: String,
    pub display_unique_code: String,
    pub display_total: String,
    pub total_amount: String,
    pub unique_code_field: String,
    pub timestamp: String,
    pub busy: bool,
    pub navigated_to: Option<String>,
}

pub struct TerminalFormView {
    fields: FormFields,
    state: Mutex<FormSnapshot>,
}

impl TerminalFormView {
    pub fn new(fields: FormFields, amount: &str) -> Self {
        Self {
            fields,
            state: Mutex::new(FormSnapshot { amount: amount.to_string(), ..Default::default() }),
        }
    }

    pub fn snapshot(&self) -> FormSnapshot {
        self.state.lock().clone()
    }

    pub fn print_summary(&self) {
        let state = self.snapshot();
        println!("Waktu           : {}", state.timestamp);
        println!("Jumlah          : Rp {}", state.display_amount);
        println!("Kode unik       : {}", state.display_unique_code);
        println!("Total transfer  : Rp {}", state.display_total);
    }
}

impl FormView for TerminalFormView {
    fn amount_text(&self) -> String {
        self.state.lock().amount.clone()
    }

    fn set_amount_text(&self, text: &str) {
        self.state.lock().amount = text.to_string();
    }

    fn select_amount(&self) {}

    fn set_display_amount(&self, text: &str) {
        self.state.lock().display_amount = text.to_string();
    }

    fn set_display_unique_code(&self, text: &str) {
        self.state.lock().display_unique_code = text.to_string();
    }

    fn set_display_total(&self, text: &str) {
        debug!("total now {}", text);
        self.state.lock().display_total = text.to_string();
    }

    fn set_total_amount(&self, text: &str) {
        self.state.lock().total_amount = text.to_string();
    }

    fn set_unique_code_field(&self, code: &str) {
        self.state.lock().unique_code_field = code.to_string();
    }

    fn set_timestamp(&self, text: &str) {
        self.state.lock().timestamp = text.to_string();
    }

    fn form_fields(&self) -> FormFields {
        self.fields.clone()
    }

    fn set_busy(&self, busy: bool) {
        if busy {
            println!("Mengirim...");
        }
        self.state.lock().busy = busy;
    }

    fn navigate(&self, url: &str) {
        println!("-> {}", url);
        self.state.lock().navigated_to = Some(url.to_string());
    }
}

#[derive(Default)]
pub struct TerminalReceiptView;

impl ReceiptView for TerminalReceiptView {
    fn show_receipt(&self, fields: &ReceiptFields) {
        println!("ID Pembayaran   : {}", fields.id);
        println!("Nama            : {}", fields.nama);
        println!("NIM             : {}", fields.nim);
        println!("Email           : {}", fields.email);
        println!("Program Studi   : {}", fields.prodi);
        println!("Semester        : {}", fields.semester);
        println!("Jumlah          : {}", fields.jumlah);
        println!("Kode Unik       : {}", fields.kode_unik);
        println!("Total           : {}", fields.total);
        println!("Waktu           : {}", fields.timestamp);
    }

    fn replace_body(&self, state: PageState) {
        println!("{}", state.heading());
        if let Some(detail) = state.detail() {
            println!("{}", detail);
        }
        if let Some((href, label)) = state.back_link() {
            println!("{} ({})", label, href);
        }
    }

    fn replace_history(&self, _url: &str) {}
}

/// The clipboard of a terminal is whatever the user selects from stdout.
pub struct StdoutClipboard;

#[async_trait]
impl Clipboard for StdoutClipboard {
    async fn write_text(&self, text: &str) -> Result<(), String> {
        println!("{}", text);
        Ok(())
    }
}

pub fn render_toast_event(event: &ToastEvent) -> Option<String> {
    match event {
        ToastEvent::Shown(toast) | ToastEvent::Updated(toast) => {
            let marker = if toast.loading { "..." } else { "" };
            Some(format!("[{}] {}{}", toast.title, toast.message, marker))
        }
        ToastEvent::Extended(_) | ToastEvent::Hiding(_) | ToastEvent::Detached(_) => None,
    }
}

/// Prints whatever toast events queued up since the last call.
pub fn drain_toasts(events: &mut broadcast::Receiver<ToastEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => {
                if let Some(line) = render_toast_event(&event) {
                    eprintln!("{}", line);
                }
            }
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                debug!("skipped {} toast events", skipped);
            }
            Err(_) => break,
        }
    }
}
