pub mod account_copy;
pub mod payment_api;
pub mod payment_form;
pub mod receipt;
pub mod scheduler;
pub mod toast;

pub use payment_api::{HttpPaymentApi, PaymentApi};
pub use payment_form::{FormView, PaymentFormController, SubmitOutcome};
pub use receipt::{ReceiptLoader, ReceiptOutcome, ReceiptView};
pub use toast::{Severity, ToastHandle, ToastManager};
