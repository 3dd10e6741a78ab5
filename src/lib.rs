//! Client side of the e-slip tuition payment flow: rupiah formatting with a
//! unique transfer code, the payment form, the receipt page and toast
//! notifications, all behind view traits so they run without a browser.

pub mod app;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use app::config::Config;
pub use error::{ApiError, ConfigError};
pub use models::payment::{PaymentPayload, PaymentRecord, UniqueCode};
