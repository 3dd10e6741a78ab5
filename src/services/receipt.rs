use crate::models::payment::PaymentRecord;
use crate::services::payment_api::PaymentApi;
use crate::utils::money::format_rupiah;
use crate::utils::time::format_record_timestamp;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Terminal states that replace the whole receipt page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    AccessDenied,
    LoadFailed,
}

impl PageState {
    pub fn heading(self) -> &'static str {
        match self {
            PageState::AccessDenied => "Akses Ditolak",
            PageState::LoadFailed => "Gagal memuat data pembayaran",
        }
    }

    pub fn detail(self) -> Option<&'static str> {
        match self {
            PageState::AccessDenied => Some("Data pembayaran tidak ditemukan."),
            PageState::LoadFailed => None,
        }
    }

    /// Link back to the form, offered only when access was denied.
    pub fn back_link(self) -> Option<(&'static str, &'static str)> {
        match self {
            PageState::AccessDenied => Some(("/", "Kembali ke halaman pembayaran")),
            PageState::LoadFailed => None,
        }
    }
}

/// Rendered values of the receipt's detail fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptFields {
    pub id: String,
    pub nama: String,
    pub nim: String,
    pub email: String,
    pub prodi: String,
    pub semester: String,
    pub jumlah: String,
    pub kode_unik: String,
    pub total: String,
    /// Long `id-ID` rendering for RFC 3339 values, where the page showed the raw string.
    pub timestamp: String,
    /// `timestamp` exactly as the backend sent it.
    pub raw_timestamp: String,
}

impl ReceiptFields {
    pub fn from_record(id: &str, record: &PaymentRecord) -> Self {
        Self {
            id: id.to_string(),
            nama: record.nama.clone(),
            nim: record.nim.clone(),
            email: record.email.clone(),
            prodi: record.prodi.clone(),
            semester: format!("Semester {}", record.semester),
            jumlah: format_rupiah(record.jumlah_pembayaran),
            kode_unik: record.kode_unik.clone(),
            // Already grouped by the backend.
            total: format!("Rp {}", record.total_pembayaran),
            timestamp: format_record_timestamp(&record.timestamp),
            raw_timestamp: record.timestamp.clone(),
        }
    }
}

pub trait ReceiptView: Send + Sync {
    fn show_receipt(&self, fields: &ReceiptFields);
    fn replace_body(&self, state: PageState);
    /// Replaces the current history entry so going back cannot resubmit the form.
    fn replace_history(&self, url: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptOutcome {
    AccessDenied,
    Loaded(PaymentRecord),
    Failed,
}

pub struct ReceiptLoader<V, A> {
    view: Arc<V>,
    api: Arc<A>,
}

/// Reads `id` from a page URL. Bare query strings such as `?id=42` work too.
pub fn payment_id(page_url: &str) -> Option<String> {
    let url = match Url::parse(page_url) {
        Ok(url) => url,
        Err(_) => Url::parse("http://localhost/").ok()?.join(page_url).ok()?,
    };

    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

impl<V: ReceiptView, A: PaymentApi> ReceiptLoader<V, A> {
    pub fn new(view: Arc<V>, api: Arc<A>) -> Self {
        Self { view, api }
    }

    pub async fn load(&self, page_url: &str) -> ReceiptOutcome {
        let Some(id) = payment_id(page_url) else {
            warn!("Receipt opened without an id");
            self.view.replace_body(PageState::AccessDenied);
            return ReceiptOutcome::AccessDenied;
        };

        match self.api.fetch_payment(&id).await {
            Ok(record) => {
                info!("Loaded receipt {}", id);
                self.view.show_receipt(&ReceiptFields::from_record(&id, &record));
                self.view.replace_history(page_url);
                ReceiptOutcome::Loaded(record)
            }
            Err(e) => {
                warn!("Failed to load receipt {}: {}", id, e);
                self.view.replace_body(PageState::LoadFailed);
                ReceiptOutcome::Failed
            }
        }
    }
}
