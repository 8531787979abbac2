use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Medicine {
    #[serde(rename = "medicine_id")]
    pub id: i64,
    #[serde(rename = "medicine_name")]
    pub name: String,
    pub batch_number: String,
    #[serde(deserialize_with = "integer")]
    pub quantity_available: i64,
    #[serde(deserialize_with = "decimal")]
    pub unit_price: f64,
    pub expiry_date: NaiveDate,
    #[serde(default)]
    pub date_of_purchase: Option<NaiveDate>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_by_name: Option<String>,
}

/// Body of `POST /api/medicines` and `PUT /api/medicines/:id`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MedicineInput {
    pub medicine_name: String,
    pub batch_number: String,
    pub expiry_date: String,
    pub date_of_purchase: String,
    pub quantity_available: i64,
    pub unit_price: f64,
    pub manufacturer: String,
    pub category: String,
    pub description: String,
}

/// Row of `GET /api/medicines/available`: in stock and not expired.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AvailableMedicine {
    #[serde(rename = "medicine_id")]
    pub id: i64,
    #[serde(rename = "medicine_name")]
    pub name: String,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(deserialize_with = "integer")]
    pub quantity_available: i64,
    #[serde(deserialize_with = "decimal")]
    pub unit_price: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Sale {
    #[serde(rename = "sale_id")]
    pub id: i64,
    #[serde(default)]
    pub medicine_id: Option<i64>,
    #[serde(default)]
    pub medicine_name: Option<String>,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(deserialize_with = "integer")]
    pub quantity_sold: i64,
    #[serde(deserialize_with = "decimal")]
    pub total_amount: f64,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub doctor_phone: Option<String>,
    #[serde(default)]
    pub prescription_photo_url: Option<String>,
    #[serde(default)]
    pub sale_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub sold_by_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of `POST /api/sales`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SaleInput {
    pub medicine_id: i64,
    pub quantity_sold: i64,
    pub doctor_name: String,
    pub doctor_phone: String,
    pub prescription_photo_url: String,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold_by: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Admin,
    Staff,
}

/// Body of `POST /api/login`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub user_type: UserType,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoginUser {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub user_type: UserType,
}

#[derive(Deserialize, Debug)]
pub(crate) struct LoginEnvelope {
    pub user: LoginUser,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Staff {
    pub staff_id: i64,
    pub full_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    #[serde(deserialize_with = "integer")]
    pub total_medicines: i64,
    #[serde(deserialize_with = "integer")]
    pub low_stock: i64,
    #[serde(deserialize_with = "integer")]
    pub expiring_soon: i64,
    #[serde(deserialize_with = "integer")]
    pub sales_today: i64,
    #[serde(deserialize_with = "decimal")]
    pub revenue_today: f64,
}

/// Generic `{success, message}` acknowledgement returned by writes.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sale_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_url: String,
    #[serde(default)]
    pub drive_url: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiptChannel {
    WhatsApp,
    Twilio,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ReceiptResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /api/create-razorpay-order`; `amount` is in paise.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PaymentOrderRequest {
    pub amount: u64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    pub notes: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub key_id: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PaymentVerification {
    pub payment_id: String,
    pub order_id: String,
    pub signature: String,
    pub form_data: SaleInput,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PaymentVerificationResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub sale_id: Option<i64>,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub medicine_info: Option<MedicineInfo>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Dosage {
    #[serde(default)]
    pub adults: Option<String>,
    #[serde(default)]
    pub children: Option<String>,
}

/// Structured medicine facts attached to a chatbot reply. Every field is
/// optional; the service sends whatever it found.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MedicineInfo {
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub brand_names: Vec<String>,
    #[serde(default)]
    pub uses: Vec<String>,
    #[serde(default)]
    pub dosage: Option<Dosage>,
    #[serde(default)]
    pub side_effects: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatHistoryEntry {
    #[serde(default)]
    pub timestamp: Option<String>,
    pub user_message: String,
    pub bot_response: String,
    #[serde(default)]
    pub medicine_info: Option<MedicineInfo>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct MedicinesEnvelope<T> {
    pub medicines: Vec<T>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct SalesEnvelope {
    pub sales: Vec<Sale>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct StaffEnvelope {
    pub staff: Staff,
}

#[derive(Deserialize, Debug)]
pub(crate) struct HistoryEnvelope {
    #[serde(default)]
    pub history: Vec<ChatHistoryEntry>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

// The API serialises SQL DECIMAL columns as strings, so money arrives as
// either `3.5` or `"3.50"`.
fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(value) => Ok(value as f64),
        NumberOrString::Float(value) => Ok(value),
        NumberOrString::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(value) => Ok(value),
        NumberOrString::Float(value) if value.fract() == 0.0 => Ok(value as i64),
        NumberOrString::Float(value) => Err(serde::de::Error::custom(format!(
            "expected an integer, got {value}"
        ))),
        NumberOrString::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn medicine_accepts_decimal_strings() {
        let medicine: Medicine = serde_json::from_value(json!({
            "medicine_id": 7,
            "medicine_name": "Omeprazole",
            "batch_number": "OM-2207",
            "quantity_available": 45,
            "unit_price": "12.50",
            "expiry_date": "2025-07-31",
            "date_of_purchase": null,
            "manufacturer": null,
            "created_at": "2024-01-01T10:00:00"
        }))
        .unwrap();

        assert_eq!(medicine.id, 7);
        assert_eq!(medicine.unit_price, 12.5);
        assert_eq!(medicine.manufacturer, None);
        assert_eq!(medicine.category, None);
    }

    #[test]
    fn medicine_input_serialises_numbers() {
        let input = MedicineInput {
            medicine_name: "Aspirin".into(),
            batch_number: "AS-1".into(),
            expiry_date: "2026-01-01".into(),
            date_of_purchase: "2025-01-01".into(),
            quantity_available: 12,
            unit_price: 3.5,
            manufacturer: String::new(),
            category: String::new(),
            description: String::new(),
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["quantity_available"], json!(12));
        assert_eq!(value["unit_price"], json!(3.5));
    }

    #[test]
    fn sale_input_omits_missing_staff() {
        let input = SaleInput {
            medicine_id: 1,
            quantity_sold: 2,
            doctor_name: String::new(),
            doctor_phone: String::new(),
            prescription_photo_url: String::new(),
            customer_name: String::new(),
            customer_phone: String::new(),
            sold_by: None,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert!(value.get("sold_by").is_none());
    }

    #[test]
    fn sparse_medicine_info() {
        let info: MedicineInfo =
            serde_json::from_value(json!({"name": "xyz", "sources": ["FDA"], "brand_names": ["A"]}))
                .unwrap();
        assert_eq!(info.generic_name, None);
        assert_eq!(info.brand_names, vec!["A".to_string()]);
        assert!(info.uses.is_empty());
    }

    #[test]
    fn integer_rejects_fractions() {
        let result: Result<DashboardStats, _> = serde_json::from_value(json!({
            "total_medicines": 1.5,
            "low_stock": 0,
            "expiring_soon": 0,
            "sales_today": 0,
            "revenue_today": 0
        }));
        assert!(result.is_err());
    }
}
