//! In-memory stand-in for the remote services, used by controller tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;

use super::models::{
    Ack, AvailableMedicine, ChatHistoryEntry, ChatReply, DashboardStats, LoginRequest, LoginUser,
    Medicine, MedicineInput, PaymentOrder, PaymentOrderRequest, PaymentVerification,
    PaymentVerificationResult, PrescriptionFile, ReceiptChannel, ReceiptResult, Sale, SaleInput,
    Staff, UploadedFile,
};
use super::{ApiError, ChatApi, PharmacyApi};

#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<String>>,
    pub failures: Mutex<HashMap<&'static str, ApiError>>,
    pub stats: Mutex<DashboardStats>,
    pub medicines: Mutex<Vec<Medicine>>,
    pub available: Mutex<Vec<AvailableMedicine>>,
    pub sales: Mutex<Vec<Sale>>,
    pub staff: Mutex<Option<Staff>>,
    pub created_medicines: Mutex<Vec<MedicineInput>>,
    pub updated_medicines: Mutex<Vec<(i64, MedicineInput)>>,
    pub deleted_medicines: Mutex<Vec<i64>>,
    pub created_sales: Mutex<Vec<SaleInput>>,
    pub uploads: Mutex<Vec<PrescriptionFile>>,
    pub chat_replies: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    pub chat_messages: Mutex<Vec<String>>,
    pub history: Mutex<Vec<ChatHistoryEntry>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, call: &'static str, error: ApiError) {
        self.failures.lock().unwrap().insert(call, error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call.to_string());
        match self.failures.lock().unwrap().get(call) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

pub fn server_error(status: u16, message: Option<&str>) -> ApiError {
    ApiError::Server {
        status: StatusCode::from_u16(status).unwrap(),
        message: message.map(str::to_string),
    }
}

pub fn transport_error() -> ApiError {
    ApiError::Transport("connection refused".to_string())
}

pub fn medicine(id: i64, name: &str, quantity: i64, expiry: NaiveDate) -> Medicine {
    Medicine {
        id,
        name: name.to_string(),
        batch_number: format!("B-{id:03}"),
        quantity_available: quantity,
        unit_price: 2.5,
        expiry_date: expiry,
        date_of_purchase: None,
        manufacturer: None,
        category: Some("Pain Relief".to_string()),
        description: None,
        created_by_name: None,
    }
}

#[async_trait]
impl PharmacyApi for FakeApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginUser, ApiError> {
        self.record("login")?;
        Ok(LoginUser {
            id: 1,
            username: request.username.clone(),
            full_name: request.username.clone(),
            email: None,
            user_type: request.user_type,
        })
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record("logout")
    }

    async fn current_staff(&self) -> Result<Staff, ApiError> {
        self.record("current_staff")?;
        self.staff
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| server_error(401, Some("Not logged in as staff")))
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.record("dashboard_stats")?;
        Ok(self.stats.lock().unwrap().clone())
    }

    async fn list_medicines(&self) -> Result<Vec<Medicine>, ApiError> {
        self.record("list_medicines")?;
        Ok(self.medicines.lock().unwrap().clone())
    }

    async fn get_medicine(&self, id: i64) -> Result<Medicine, ApiError> {
        self.record("get_medicine")?;
        self.medicines
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| server_error(404, Some("Medicine not found")))
    }

    async fn create_medicine(&self, input: &MedicineInput) -> Result<Ack, ApiError> {
        self.record("create_medicine")?;
        self.created_medicines.lock().unwrap().push(input.clone());
        Ok(Ack {
            success: true,
            message: Some("Medicine added successfully".to_string()),
            sale_id: None,
        })
    }

    async fn update_medicine(&self, id: i64, input: &MedicineInput) -> Result<Ack, ApiError> {
        self.record("update_medicine")?;
        self.updated_medicines
            .lock()
            .unwrap()
            .push((id, input.clone()));
        Ok(Ack {
            success: true,
            ..Ack::default()
        })
    }

    async fn delete_medicine(&self, id: i64) -> Result<Ack, ApiError> {
        self.record("delete_medicine")?;
        self.deleted_medicines.lock().unwrap().push(id);
        self.medicines.lock().unwrap().retain(|m| m.id != id);
        Ok(Ack {
            success: true,
            ..Ack::default()
        })
    }

    async fn available_medicines(&self) -> Result<Vec<AvailableMedicine>, ApiError> {
        self.record("available_medicines")?;
        Ok(self.available.lock().unwrap().clone())
    }

    async fn list_sales(&self) -> Result<Vec<Sale>, ApiError> {
        self.record("list_sales")?;
        Ok(self.sales.lock().unwrap().clone())
    }

    async fn create_sale(&self, input: &SaleInput) -> Result<Ack, ApiError> {
        self.record("create_sale")?;
        self.created_sales.lock().unwrap().push(input.clone());
        // Same body `POST /api/sales` sends: no id for the new sale.
        Ok(serde_json::from_value(serde_json::json!({
            "success": true,
            "message": "Sale recorded successfully"
        }))
        .unwrap())
    }

    async fn upload_prescription(
        &self,
        file: &PrescriptionFile,
    ) -> Result<UploadedFile, ApiError> {
        self.record("upload_prescription")?;
        self.uploads.lock().unwrap().push(file.clone());
        Ok(UploadedFile {
            file_url: format!("http://localhost:5000/uploads/{}", file.file_name),
            drive_url: None,
        })
    }

    async fn send_receipt(
        &self,
        sale_id: i64,
        channel: ReceiptChannel,
    ) -> Result<ReceiptResult, ApiError> {
        self.record(match channel {
            ReceiptChannel::WhatsApp => "send_receipt",
            ReceiptChannel::Twilio => "send_receipt_twilio",
        })?;
        Ok(ReceiptResult {
            success: true,
            message: Some(format!("Receipt for sale {sale_id} sent")),
        })
    }

    async fn create_payment_order(
        &self,
        request: &PaymentOrderRequest,
    ) -> Result<PaymentOrder, ApiError> {
        self.record("create_payment_order")?;
        Ok(PaymentOrder {
            id: "order_test".to_string(),
            amount: request.amount,
            currency: request.currency.clone(),
            key_id: Some("rzp_test".to_string()),
        })
    }

    async fn verify_payment(
        &self,
        request: &PaymentVerification,
    ) -> Result<PaymentVerificationResult, ApiError> {
        self.record("verify_payment")?;
        Ok(PaymentVerificationResult {
            success: true,
            sale_id: Some(101),
            payment_id: Some(request.payment_id.clone()),
            message: Some("Payment verified and sale recorded successfully".to_string()),
        })
    }
}

#[async_trait]
impl ChatApi for FakeApi {
    async fn send_message(&self, message: &str) -> Result<ChatReply, ApiError> {
        self.record("chat")?;
        self.chat_messages.lock().unwrap().push(message.to_string());
        self.chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(ChatReply {
                    response: format!("You said: {message}"),
                    medicine_info: None,
                    timestamp: None,
                })
            })
    }

    async fn history(&self) -> Result<Vec<ChatHistoryEntry>, ApiError> {
        self.record("chat_history")?;
        Ok(self.history.lock().unwrap().clone())
    }
}
