use async_trait::async_trait;
use reqwest::{multipart, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod models;

#[cfg(test)]
pub mod fake;

use models::{
    Ack, AvailableMedicine, ChatHistoryEntry, ChatReply, ChatRequest, DashboardStats, ErrorBody,
    HistoryEnvelope, LoginEnvelope, LoginRequest, LoginUser, Medicine, MedicineInput,
    MedicinesEnvelope, PaymentOrder, PaymentOrderRequest, PaymentVerification,
    PaymentVerificationResult, PrescriptionFile, ReceiptChannel, ReceiptResult, Sale, SaleInput,
    SalesEnvelope, Staff, StaffEnvelope, UploadedFile,
};

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("API base URL is missing")]
    BaseUrlMissing,
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Failed to read response: {0}")]
    Read(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Server returned {status}: {}", .message.as_deref().unwrap_or("<no error message>"))]
    Server {
        status: StatusCode,
        message: Option<String>,
    },
}

/// The two ways a request can fail once it has been attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Never reached the server, or the reply could not be read.
    Transport,
    /// The server answered with a non-2xx status.
    Server,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Server { .. } => ErrorKind::Server,
            Self::BaseUrlMissing | Self::Transport(_) | Self::Read(_) | Self::Decode(_) => {
                ErrorKind::Transport
            }
        }
    }

    /// The `error` field of a non-2xx body, if the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Remote pharmacy resource API.
#[async_trait]
pub trait PharmacyApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginUser, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn current_staff(&self) -> Result<Staff, ApiError>;

    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError>;

    async fn list_medicines(&self) -> Result<Vec<Medicine>, ApiError>;
    async fn get_medicine(&self, id: i64) -> Result<Medicine, ApiError>;
    async fn create_medicine(&self, input: &MedicineInput) -> Result<Ack, ApiError>;
    async fn update_medicine(&self, id: i64, input: &MedicineInput) -> Result<Ack, ApiError>;
    async fn delete_medicine(&self, id: i64) -> Result<Ack, ApiError>;
    async fn available_medicines(&self) -> Result<Vec<AvailableMedicine>, ApiError>;

    async fn list_sales(&self) -> Result<Vec<Sale>, ApiError>;
    async fn create_sale(&self, input: &SaleInput) -> Result<Ack, ApiError>;
    async fn upload_prescription(&self, file: &PrescriptionFile)
        -> Result<UploadedFile, ApiError>;
    async fn send_receipt(
        &self,
        sale_id: i64,
        channel: ReceiptChannel,
    ) -> Result<ReceiptResult, ApiError>;

    async fn create_payment_order(
        &self,
        request: &PaymentOrderRequest,
    ) -> Result<PaymentOrder, ApiError>;
    async fn verify_payment(
        &self,
        request: &PaymentVerification,
    ) -> Result<PaymentVerificationResult, ApiError>;
}

/// Remote chatbot service.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_message(&self, message: &str) -> Result<ChatReply, ApiError>;
    async fn history(&self) -> Result<Vec<ChatHistoryEntry>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    chatbot_base_url: String,
    http: reqwest::Client,
}

impl HttpClient {
    pub fn new(base_url: &str, chatbot_base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            chatbot_base_url: normalize_base_url(chatbot_base_url)?,
            http,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn chatbot_endpoint(&self, path: &str) -> String {
        join_url(&self.chatbot_base_url, path)
    }

    pub fn medicine_path(id: i64) -> String {
        format!("/api/medicines/{id}")
    }

    pub fn receipt_path(sale_id: i64, channel: ReceiptChannel) -> String {
        match channel {
            ReceiptChannel::WhatsApp => format!("/api/send-receipt/{sale_id}"),
            ReceiptChannel::Twilio => format!("/api/send-receipt-twilio/{sale_id}"),
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("x-request-id", format!("req_{}", Uuid::new_v4().simple()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        log::debug!("GET {}", url);
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        decode_json_response(response).await
    }

    async fn send_json<Req, Res>(
        &self,
        method: reqwest::Method,
        url: &str,
        payload: Option<&Req>,
    ) -> Result<Res, ApiError>
    where
        Req: Serialize + ?Sized + Sync,
        Res: DeserializeOwned,
    {
        log::debug!("{} {}", method, url);
        let mut request = self.request(method, url);
        if let Some(payload) = payload {
            request = request.json(payload);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        decode_json_response(response).await
    }
}

#[async_trait]
impl PharmacyApi for HttpClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginUser, ApiError> {
        let envelope: LoginEnvelope = self
            .send_json(
                reqwest::Method::POST,
                &self.endpoint("/api/login"),
                Some(request),
            )
            .await?;
        Ok(envelope.user)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoint("/api/logout");
        let response = self
            .request(reqwest::Method::POST, &url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        // A successful logout carries no body worth decoding.
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ApiError::Read(e.to_string()))?;
            Err(format_http_error(status, &bytes))
        }
    }

    async fn current_staff(&self) -> Result<Staff, ApiError> {
        let envelope: StaffEnvelope = self.get_json(&self.endpoint("/api/current-staff")).await?;
        Ok(envelope.staff)
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get_json(&self.endpoint("/api/dashboard/stats")).await
    }

    async fn list_medicines(&self) -> Result<Vec<Medicine>, ApiError> {
        let envelope: MedicinesEnvelope<Medicine> =
            self.get_json(&self.endpoint("/api/medicines")).await?;
        Ok(envelope.medicines)
    }

    async fn get_medicine(&self, id: i64) -> Result<Medicine, ApiError> {
        self.get_json(&self.endpoint(&Self::medicine_path(id))).await
    }

    async fn create_medicine(&self, input: &MedicineInput) -> Result<Ack, ApiError> {
        self.send_json(
            reqwest::Method::POST,
            &self.endpoint("/api/medicines"),
            Some(input),
        )
        .await
    }

    async fn update_medicine(&self, id: i64, input: &MedicineInput) -> Result<Ack, ApiError> {
        self.send_json(
            reqwest::Method::PUT,
            &self.endpoint(&Self::medicine_path(id)),
            Some(input),
        )
        .await
    }

    async fn delete_medicine(&self, id: i64) -> Result<Ack, ApiError> {
        self.send_json::<(), _>(
            reqwest::Method::DELETE,
            &self.endpoint(&Self::medicine_path(id)),
            None,
        )
        .await
    }

    async fn available_medicines(&self) -> Result<Vec<AvailableMedicine>, ApiError> {
        let envelope: MedicinesEnvelope<AvailableMedicine> = self
            .get_json(&self.endpoint("/api/medicines/available"))
            .await?;
        Ok(envelope.medicines)
    }

    async fn list_sales(&self) -> Result<Vec<Sale>, ApiError> {
        let envelope: SalesEnvelope = self.get_json(&self.endpoint("/api/sales")).await?;
        Ok(envelope.sales)
    }

    async fn create_sale(&self, input: &SaleInput) -> Result<Ack, ApiError> {
        self.send_json(
            reqwest::Method::POST,
            &self.endpoint("/api/sales"),
            Some(input),
        )
        .await
    }

    async fn upload_prescription(
        &self,
        file: &PrescriptionFile,
    ) -> Result<UploadedFile, ApiError> {
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let form = multipart::Form::new().part("prescription", part);

        let url = self.endpoint("/api/upload-prescription");
        log::debug!("POST {} ({} bytes)", url, file.bytes.len());
        let response = self
            .request(reqwest::Method::POST, &url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        decode_json_response(response).await
    }

    async fn send_receipt(
        &self,
        sale_id: i64,
        channel: ReceiptChannel,
    ) -> Result<ReceiptResult, ApiError> {
        self.send_json::<(), _>(
            reqwest::Method::POST,
            &self.endpoint(&Self::receipt_path(sale_id, channel)),
            None,
        )
        .await
    }

    async fn create_payment_order(
        &self,
        request: &PaymentOrderRequest,
    ) -> Result<PaymentOrder, ApiError> {
        self.send_json(
            reqwest::Method::POST,
            &self.endpoint("/api/create-razorpay-order"),
            Some(request),
        )
        .await
    }

    async fn verify_payment(
        &self,
        request: &PaymentVerification,
    ) -> Result<PaymentVerificationResult, ApiError> {
        self.send_json(
            reqwest::Method::POST,
            &self.endpoint("/api/verify-razorpay-payment"),
            Some(request),
        )
        .await
    }
}

#[async_trait]
impl ChatApi for HttpClient {
    async fn send_message(&self, message: &str) -> Result<ChatReply, ApiError> {
        let request = ChatRequest {
            message: message.to_string(),
        };
        self.send_json(
            reqwest::Method::POST,
            &self.chatbot_endpoint("/chat"),
            Some(&request),
        )
        .await
    }

    async fn history(&self) -> Result<Vec<ChatHistoryEntry>, ApiError> {
        let envelope: HistoryEnvelope = self.get_json(&self.chatbot_endpoint("/history")).await?;
        Ok(envelope.history)
    }
}

pub fn format_http_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error)
        .map(|error| error.trim().to_string())
        .filter(|error| !error.is_empty());
    ApiError::Server { status, message }
}

fn normalize_base_url(base_url: &str) -> Result<String, ApiError> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BaseUrlMissing);
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base, path.trim().trim_start_matches('/'))
}

async fn decode_json_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Read(e.to_string()))?;

    if !status.is_success() {
        return Err(format_http_error(status, &bytes));
    }

    serde_json::from_slice::<T>(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}
