use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Three digit suffix the backend uses to match a bank transfer to its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UniqueCode(u16);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid unique code {0:?}")]
pub struct InvalidUniqueCode(pub String);

impl UniqueCode {
    pub const MAX: u16 = 999;

    /// Used until the backend hands out a code, and kept if it never does.
    pub const DEFAULT: UniqueCode = UniqueCode(0);

    pub fn new(value: u16) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for UniqueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl FromStr for UniqueCode {
    type Err = InvalidUniqueCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidUniqueCode(s.to_string()));
        }

        trimmed
            .parse::<u16>()
            .ok()
            .and_then(UniqueCode::new)
            .ok_or_else(|| InvalidUniqueCode(s.to_string()))
    }
}

/// Raw form values, as the page would hand them over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub nama: String,
    pub email: String,
    pub nim: String,
    pub prodi: String,
    pub semester: String,
}

/// Body of `POST /payments`. `semester` goes out as `null` when the field holds no number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPayload {
    pub nama: String,
    pub email: String,
    pub nim: String,
    pub prodi: String,
    pub semester: Option<i32>,
    pub kode_unik: String,
    pub jumlah_pembayaran: u64,
}

/// Stored payment as returned by `GET /payments/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub nama: String,
    pub email: String,
    pub nim: String,
    pub prodi: String,
    #[serde(deserialize_with = "string_or_number")]
    pub semester: String,
    #[serde(deserialize_with = "amount_string_or_number")]
    pub jumlah_pembayaran: u64,
    #[serde(rename = "kodeUnik", deserialize_with = "string_or_number")]
    pub kode_unik: String,
    #[serde(deserialize_with = "string_or_number")]
    pub total_pembayaran: String,
    pub timestamp: String,
}

/// Common `{ success, data, errors, message }` wrapper of every backend response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub errors: Option<Vec<String>>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// `errors` joined with `", "`, falling back to `message`.
    pub fn error_text(&self) -> Option<String> {
        match &self.errors {
            Some(errors) if !errors.is_empty() => Some(errors.join(", ")),
            _ => self.message.clone().filter(|m| !m.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedCode {
    pub kode_unik: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmitResponse {
    pub redirect_url: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}

// Whole rupiah, sent either as a JSON number or as a digit string.
fn amount_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Float(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
        Raw::Float(f) => Err(de::Error::custom(format!("invalid amount {}", f))),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid amount {:?}", s))),
    }
}
