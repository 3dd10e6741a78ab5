use crate::app::config::Config;
use crate::error::ApiError;
use crate::models::payment::{
    ApiEnvelope, GeneratedCode, PaymentPayload, PaymentRecord, SubmitResponse, UniqueCode,
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, info, warn};

#[async_trait]
pub trait PaymentApi: Send + Sync {
    async fn generate_code(&self) -> Result<UniqueCode, ApiError>;

    async fn submit_payment(&self, payload: &PaymentPayload) -> Result<SubmitResponse, ApiError>;

    async fn fetch_payment(&self, id: &str) -> Result<PaymentRecord, ApiError>;
}

pub struct HttpPaymentApi {
    client: Client,
    api_base: Url,
    receipt_base: Url,
}

impl HttpPaymentApi {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut builder = Client::builder()
            .user_agent(concat!("eslip-client/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_base: Url::parse(&config.api_base_url)?,
            receipt_base: Url::parse(&config.receipt_base_url)?,
        })
    }
}

pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::Rejected(format!("{base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[async_trait]
impl PaymentApi for HttpPaymentApi {
    async fn generate_code(&self) -> Result<UniqueCode, ApiError> {
        let url = endpoint(&self.api_base, &["generate-code"])?;
        debug!("GET {}", url);

        let body: ApiEnvelope<GeneratedCode> = self.client.get(url).send().await?.json().await?;

        match body.data {
            Some(data) if body.success => data
                .kode_unik
                .parse::<UniqueCode>()
                .map_err(|e| ApiError::Rejected(e.to_string())),
            _ => Err(ApiError::Rejected(
                body.error_text().unwrap_or_else(|| "code generation failed".to_string()),
            )),
        }
    }

    async fn submit_payment(&self, payload: &PaymentPayload) -> Result<SubmitResponse, ApiError> {
        let url = endpoint(&self.api_base, &["payments"])?;
        info!(
            "Submitting payment for NIM {} ({} + kode {})",
            payload.nim, payload.jumlah_pembayaran, payload.kode_unik
        );

        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            // Error bodies are best effort, a proxy page is not JSON.
            let message = response
                .json::<ApiEnvelope<SubmitResponse>>()
                .await
                .ok()
                .and_then(|body| body.error_text());
            warn!("Payment submission returned status: {}", status);
            return Err(ApiError::Status { status: status.as_u16(), message });
        }

        let body: ApiEnvelope<SubmitResponse> = response.json().await?;
        Ok(body.data.unwrap_or_default())
    }

    async fn fetch_payment(&self, id: &str) -> Result<PaymentRecord, ApiError> {
        let url = endpoint(&self.receipt_base, &["payments", id])?;
        debug!("GET {}", url);

        let body: ApiEnvelope<PaymentRecord> = self.client.get(url).send().await?.json().await?;

        match body.data {
            Some(record) if body.success => Ok(record),
            _ => Err(ApiError::NotFound(id.to_string())),
        }
    }
}
