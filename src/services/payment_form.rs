use crate::error::ApiError;
use crate::models::payment::{FormFields, PaymentPayload, UniqueCode};
use crate::services::payment_api::PaymentApi;
use crate::services::scheduler::ScheduledTask;
use crate::services::toast::ToastManager;
use crate::utils::money::{self, MIN_AMOUNT_WARNING};
use crate::utils::time::format_timestamp;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const SUBMIT_SUCCESS_MESSAGE: &str = "Data pembayaran berhasil dikirim";
pub const SUBMIT_FAILED_MESSAGE: &str = "Gagal mengirim data. Coba lagi.";
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_millis(1200);

pub trait FormView: Send + Sync + 'static {
    fn amount_text(&self) -> String;
    fn set_amount_text(&self, text: &str);
    fn select_amount(&self);

    fn set_display_amount(&self, text: &str);
    fn set_display_unique_code(&self, text: &str);
    fn set_display_total(&self, text: &str);
    fn set_total_amount(&self, text: &str);
    fn set_unique_code_field(&self, code: &str);
    fn set_timestamp(&self, text: &str);

    fn form_fields(&self) -> FormFields;
    fn set_busy(&self, busy: bool);
    fn navigate(&self, url: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored,
    Failed { message: String },
    Submitted,
    Redirecting { url: String },
}

pub struct PaymentFormController<V, A> {
    view: Arc<V>,
    api: Arc<A>,
    toasts: ToastManager,
    unique_code: Mutex<UniqueCode>,
    submitting: AtomicBool,
    redirect_delay: Duration,
    pending_redirect: Mutex<Option<ScheduledTask>>,
}

// Clears the busy state however the submission ends.
struct BusyGuard<'a, V: FormView> {
    flag: &'a AtomicBool,
    view: &'a V,
}

impl<V: FormView> Drop for BusyGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_busy(false);
        self.flag.store(false, Ordering::Release);
    }
}

// Leading integer of the field, `None` when it has none; the backend judges the rest.
fn parse_leading_int(text: &str) -> Option<i32> {
    let text = text.trim_start();
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<i32>().ok().map(|n| sign * n)
}

impl<V: FormView, A: PaymentApi> PaymentFormController<V, A> {
    pub fn new(view: Arc<V>, api: Arc<A>, toasts: ToastManager) -> Self {
        Self {
            view,
            api,
            toasts,
            unique_code: Mutex::new(UniqueCode::DEFAULT),
            submitting: AtomicBool::new(false),
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            pending_redirect: Mutex::new(None),
        }
    }

    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    pub fn unique_code(&self) -> UniqueCode {
        *self.unique_code.lock()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn toasts(&self) -> &ToastManager {
        &self.toasts
    }

    pub async fn init(&self) {
        self.calculate_total();
        self.request_new_code().await;
    }

    pub fn on_amount_input(&self) {
        let value = money::to_number(&self.view.amount_text());
        let text = if value == 0 {
            String::new()
        } else {
            money::to_display(&value.to_string())
        };
        self.view.set_amount_text(&text);
        self.calculate_total();
    }

    pub fn on_amount_blur(&self) {
        let value = match money::apply_minimum(money::to_number(&self.view.amount_text())) {
            Ok(value) => value,
            Err(below) => {
                debug!("Amount {} below minimum, resetting", below.rejected);
                self.toasts.warning(MIN_AMOUNT_WARNING);
                0
            }
        };

        self.view.set_amount_text(&money::to_display(&value.to_string()));
        self.calculate_total();
    }

    pub fn on_amount_focus(&self) {
        self.view.select_amount();
    }

    pub fn calculate_total(&self) {
        let raw = self.view.amount_text();
        let code = self.unique_code();
        let display = money::to_display(&raw);

        self.view.set_display_amount(&display);
        self.view.set_display_unique_code(&code.to_string());
        self.view.set_display_total(&money::to_total_with_code(&raw, code));
        self.view.set_total_amount(&display);
    }

    // Failures are swallowed, the previous code stays.
    pub async fn request_new_code(&self) -> UniqueCode {
        match self.api.generate_code().await {
            Ok(code) => {
                info!("Received unique code {}", code);
                *self.unique_code.lock() = code;
            }
            Err(e) => {
                warn!("Keeping unique code {}: {}", self.unique_code(), e);
            }
        }

        let code = self.unique_code();
        self.view.set_unique_code_field(&code.to_string());
        self.view.set_timestamp(&format_timestamp(Utc::now()));
        self.calculate_total();
        code
    }

    pub async fn submit(&self) -> SubmitOutcome {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Submission already in flight, ignoring");
            return SubmitOutcome::Ignored;
        }

        self.view.set_busy(true);
        let _busy = BusyGuard { flag: &self.submitting, view: self.view.as_ref() };

        let payload = self.build_payload();

        match self.api.submit_payment(&payload).await {
            Ok(response) => {
                self.toasts.success(SUBMIT_SUCCESS_MESSAGE);
                match response.redirect_url.filter(|url| !url.is_empty()) {
                    Some(url) => {
                        info!("Payment accepted, redirecting to {}", url);
                        self.schedule_redirect(url.clone());
                        SubmitOutcome::Redirecting { url }
                    }
                    None => {
                        error!("Payment accepted but response carried no redirect_url");
                        SubmitOutcome::Submitted
                    }
                }
            }
            Err(ApiError::Status { status, message }) => {
                warn!("Payment rejected with HTTP {}", status);
                let message = message.unwrap_or_else(|| SUBMIT_FAILED_MESSAGE.to_string());
                self.toasts.error(message.clone());
                SubmitOutcome::Failed { message }
            }
            Err(e) => {
                error!("Failed to submit payment: {}", e);
                self.toasts.error(SUBMIT_FAILED_MESSAGE);
                SubmitOutcome::Failed { message: SUBMIT_FAILED_MESSAGE.to_string() }
            }
        }
    }

    fn build_payload(&self) -> PaymentPayload {
        let fields = self.view.form_fields();
        let semester = parse_leading_int(&fields.semester);

        PaymentPayload {
            nama: fields.nama,
            email: fields.email,
            nim: fields.nim,
            prodi: fields.prodi,
            semester,
            kode_unik: self.unique_code().to_string(),
            jumlah_pembayaran: money::to_number(&self.view.amount_text()),
        }
    }

    fn schedule_redirect(&self, url: String) {
        let view = Arc::clone(&self.view);
        let task = ScheduledTask::after(self.redirect_delay, move || view.navigate(&url));

        if let Some(previous) = self.pending_redirect.lock().replace(task) {
            previous.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payment::{PaymentRecord, SubmitResponse};
    use crate::services::toast::Severity;
    use async_trait::async_trait;
    use tokio::time::sleep;

    #[derive(Default)]
    struct ViewState {
        amount: String,
        selected: bool,
        display_amount: String,
        display_code: String,
        display_total: String,
        total_amount: String,
        code_field: String,
        timestamp: String,
        busy_history: Vec<bool>,
        navigated: Vec<String>,
    }

    struct FakeView {
        state: Mutex<ViewState>,
        fields: FormFields,
    }

    impl FakeView {
        fn new(amount: &str) -> Arc<Self> {
            Arc::new(Self {
                state: Mutex::new(ViewState { amount: amount.to_string(), ..Default::default() }),
                fields: FormFields {
                    nama: "Siti Aminah".into(),
                    email: "siti@kampus.ac.id".into(),
                    nim: "2201002".into(),
                    prodi: "Sistem Informasi".into(),
                    semester: "5".into(),
                },
            })
        }
    }

    impl FormView for FakeView {
        fn amount_text(&self) -> String {
            self.state.lock().amount.clone()
        }

        fn set_amount_text(&self, text: &str) {
            self.state.lock().amount = text.to_string();
        }

        fn select_amount(&self) {
            self.state.lock().selected = true;
        }

        fn set_display_amount(&self, text: &str) {
            self.state.lock().display_amount = text.to_string();
        }

        fn set_display_unique_code(&self, text: &str) {
            self.state.lock().display_code = text.to_string();
        }

        fn set_display_total(&self, text: &str) {
            self.state.lock().display_total = text.to_string();
        }

        fn set_total_amount(&self, text: &str) {
            self.state.lock().total_amount = text.to_string();
        }

        fn set_unique_code_field(&self, code: &str) {
            self.state.lock().code_field = code.to_string();
        }

        fn set_timestamp(&self, text: &str) {
            self.state.lock().timestamp = text.to_string();
        }

        fn form_fields(&self) -> FormFields {
            self.fields.clone()
        }

        fn set_busy(&self, busy: bool) {
            self.state.lock().busy_history.push(busy);
        }

        fn navigate(&self, url: &str) {
            self.state.lock().navigated.push(url.to_string());
        }
    }

    enum SubmitScript {
        Accept(Option<&'static str>),
        Status(u16, Option<&'static str>),
        Broken,
    }

    struct FakeApi {
        code: Option<u16>,
        submit: SubmitScript,
        latency: Duration,
        received: Mutex<Vec<PaymentPayload>>,
    }

    impl FakeApi {
        fn new(code: Option<u16>, submit: SubmitScript) -> Arc<Self> {
            Arc::new(Self {
                code,
                submit,
                latency: Duration::ZERO,
                received: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PaymentApi for FakeApi {
        async fn generate_code(&self) -> Result<UniqueCode, ApiError> {
            self.code
                .and_then(UniqueCode::new)
                .ok_or_else(|| ApiError::Rejected("offline".into()))
        }

        async fn submit_payment(
            &self,
            payload: &PaymentPayload,
        ) -> Result<SubmitResponse, ApiError> {
            self.received.lock().push(payload.clone());
            sleep(self.latency).await;
            match &self.submit {
                SubmitScript::Accept(url) => {
                    Ok(SubmitResponse { redirect_url: url.map(String::from) })
                }
                SubmitScript::Status(status, message) => Err(ApiError::Status {
                    status: *status,
                    message: message.map(String::from),
                }),
                SubmitScript::Broken => Err(ApiError::Rejected("connection reset".into())),
            }
        }

        async fn fetch_payment(&self, id: &str) -> Result<PaymentRecord, ApiError> {
            Err(ApiError::NotFound(id.to_string()))
        }
    }

    fn controller(
        view: &Arc<FakeView>,
        api: &Arc<FakeApi>,
    ) -> PaymentFormController<FakeView, FakeApi> {
        PaymentFormController::new(view.clone(), api.clone(), ToastManager::new())
    }

    #[tokio::test]
    async fn test_input_reformats_and_recomputes() {
        let view = FakeView::new("1500000");
        let api = FakeApi::new(Some(42), SubmitScript::Broken);
        let form = controller(&view, &api);
        form.request_new_code().await;

        view.set_amount_text("2.500.0001");
        form.on_amount_input();

        let state = view.state.lock();
        assert_eq!(state.amount, "25.000.001");
        assert_eq!(state.display_amount, "25.000.001");
        assert_eq!(state.display_code, "042");
        assert_eq!(state.display_total, "25.000.001");
        assert_eq!(state.total_amount, "25.000.001");
    }

    #[tokio::test]
    async fn test_input_splices_code_into_total() {
        let view = FakeView::new("1500000");
        let api = FakeApi::new(Some(7), SubmitScript::Broken);
        let form = controller(&view, &api);
        form.request_new_code().await;

        form.on_amount_input();
        assert_eq!(view.state.lock().display_total, "1.500.007");
    }

    #[tokio::test]
    async fn test_input_without_digits_clears_field() {
        let view = FakeView::new("abc");
        let api = FakeApi::new(None, SubmitScript::Broken);
        let form = controller(&view, &api);

        form.on_amount_input();
        let state = view.state.lock();
        assert_eq!(state.amount, "");
        assert_eq!(state.display_amount, "0");
    }

    #[tokio::test]
    async fn test_blur_below_minimum_resets_and_warns_once() {
        let view = FakeView::new("99");
        let api = FakeApi::new(None, SubmitScript::Broken);
        let form = controller(&view, &api);

        form.on_amount_blur();

        assert_eq!(view.state.lock().amount, "0");
        let toasts = form.toasts().snapshot();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].severity, Severity::Warning);
        assert_eq!(toasts[0].message, MIN_AMOUNT_WARNING);
    }

    #[tokio::test]
    async fn test_blur_keeps_valid_amount() {
        let view = FakeView::new("100");
        let api = FakeApi::new(None, SubmitScript::Broken);
        let form = controller(&view, &api);

        form.on_amount_blur();
        assert_eq!(view.state.lock().amount, "100");
        assert_eq!(form.toasts().count(), 0);
    }

    #[tokio::test]
    async fn test_focus_selects_amount() {
        let view = FakeView::new("");
        let form = controller(&view, &FakeApi::new(None, SubmitScript::Broken));
        form.on_amount_focus();
        assert!(view.state.lock().selected);
    }

    #[tokio::test]
    async fn test_code_failure_keeps_default_silently() {
        let view = FakeView::new("1000000");
        let api = FakeApi::new(None, SubmitScript::Broken);
        let form = controller(&view, &api);

        let code = form.request_new_code().await;

        assert_eq!(code, UniqueCode::DEFAULT);
        let state = view.state.lock();
        assert_eq!(state.code_field, "000");
        assert_eq!(state.display_total, "1.000.000");
        assert!(!state.timestamp.is_empty());
        drop(state);
        assert_eq!(form.toasts().count(), 0);
    }

    #[tokio::test]
    async fn test_init_adopts_backend_code() {
        let view = FakeView::new("1000000");
        let api = FakeApi::new(Some(5), SubmitScript::Broken);
        let form = controller(&view, &api);

        form.init().await;

        assert_eq!(form.unique_code().value(), 5);
        let state = view.state.lock();
        assert_eq!(state.code_field, "005");
        assert_eq!(state.display_total, "1.000.005");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_redirects_after_delay() {
        let view = FakeView::new("1.500.000");
        let api = FakeApi::new(Some(123), SubmitScript::Accept(Some("/success.html?id=p-1")));
        let form = controller(&view, &api);
        form.request_new_code().await;

        let outcome = form.submit().await;
        assert_eq!(outcome, SubmitOutcome::Redirecting { url: "/success.html?id=p-1".into() });

        let toasts = form.toasts().snapshot();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].severity, Severity::Success);
        assert_eq!(toasts[0].message, SUBMIT_SUCCESS_MESSAGE);

        sleep(Duration::from_millis(1199)).await;
        assert!(view.state.lock().navigated.is_empty());
        sleep(Duration::from_millis(2)).await;
        assert_eq!(view.state.lock().navigated, vec!["/success.html?id=p-1".to_string()]);

        let payload = api.received.lock()[0].clone();
        assert_eq!(payload.jumlah_pembayaran, 1_500_000);
        assert_eq!(payload.kode_unik, "123");
        assert_eq!(payload.semester, Some(5));
        assert_eq!(view.state.lock().busy_history, vec![true, false]);
    }

    #[tokio::test]
    async fn test_submit_joins_server_errors() {
        let view = FakeView::new("1.000.000");
        let api = FakeApi::new(None, SubmitScript::Status(422, Some("a, b")));
        let form = controller(&view, &api);

        let outcome = form.submit().await;

        assert_eq!(outcome, SubmitOutcome::Failed { message: "a, b".into() });
        let toasts = form.toasts().snapshot();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].severity, Severity::Error);
        assert_eq!(toasts[0].message, "a, b");
        assert!(!form.is_submitting());
        assert_eq!(view.state.lock().busy_history, vec![true, false]);
    }

    #[tokio::test]
    async fn test_submit_status_without_message_is_generic() {
        let view = FakeView::new("1.000.000");
        let form = controller(&view, &FakeApi::new(None, SubmitScript::Status(500, None)));

        let outcome = form.submit().await;
        assert_eq!(outcome, SubmitOutcome::Failed { message: SUBMIT_FAILED_MESSAGE.into() });
    }

    #[tokio::test]
    async fn test_submit_network_error_is_generic() {
        let view = FakeView::new("1.000.000");
        let form = controller(&view, &FakeApi::new(None, SubmitScript::Broken));

        let outcome = form.submit().await;
        assert_eq!(outcome, SubmitOutcome::Failed { message: SUBMIT_FAILED_MESSAGE.into() });
        assert_eq!(form.toasts().snapshot()[0].message, SUBMIT_FAILED_MESSAGE);
        assert!(!form.is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_without_redirect_stays_on_page() {
        let view = FakeView::new("1.000.000");
        let form = controller(&view, &FakeApi::new(None, SubmitScript::Accept(None)));

        assert_eq!(form.submit().await, SubmitOutcome::Submitted);
        sleep(Duration::from_secs(5)).await;
        assert!(view.state.lock().navigated.is_empty());
        assert_eq!(form.toasts().count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_sends_null_semester_when_not_a_number() {
        let view = Arc::new(FakeView {
            state: Mutex::new(ViewState { amount: "1.000.000".into(), ..Default::default() }),
            fields: FormFields { semester: "lima".into(), ..Default::default() },
        });
        let api = FakeApi::new(None, SubmitScript::Accept(None));
        let form = controller(&view, &api);

        let outcome = form.submit().await;

        assert_eq!(outcome, SubmitOutcome::Submitted);
        let payload = api.received.lock()[0].clone();
        assert_eq!(payload.semester, None);
        let body = serde_json::to_value(&payload).unwrap();
        assert!(body["semester"].is_null());
        assert_eq!(body["jumlah_pembayaran"], 1_000_000);
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("5"), Some(5));
        assert_eq!(parse_leading_int(" 7 "), Some(7));
        assert_eq!(parse_leading_int("3abc"), Some(3));
        assert_eq!(parse_leading_int("-2"), Some(-2));
        assert_eq!(parse_leading_int("lima"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_submit_is_ignored() {
        let view = FakeView::new("1.000.000");
        let api = Arc::new(FakeApi {
            code: None,
            submit: SubmitScript::Accept(None),
            latency: Duration::from_millis(500),
            received: Mutex::new(Vec::new()),
        });
        let form = controller(&view, &api);

        let (first, second) = tokio::join!(form.submit(), form.submit());

        assert_eq!(first, SubmitOutcome::Submitted);
        assert_eq!(second, SubmitOutcome::Ignored);
        assert_eq!(api.received.lock().len(), 1);
        assert_eq!(view.state.lock().busy_history, vec![true, false]);
    }
}
