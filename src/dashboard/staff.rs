use std::sync::Arc;

use serde_json::json;

use super::{logout, sale_row, StatsPanel};
use crate::api::models::{
    AvailableMedicine, PaymentOrder, PaymentOrderRequest, PaymentVerification, PrescriptionFile,
    ReceiptChannel, ReceiptResult, Sale, SaleInput, Staff,
};
use crate::api::PharmacyApi;
use crate::executor::{Action, Executor, Outcome};
use crate::ui::{Form, Host, Row, Table};
use crate::utils::{format_currency, validate_phone};

const STAFF: Action = Action::new("load staff info", "staff_load_failed", "staff_load_error");
const STATS: Action =
    Action::new("load dashboard stats", "stats_load_failed", "stats_load_error").quiet();
const AVAILABLE: Action = Action::new(
    "load available medicines",
    "available_load_failed",
    "available_load_error",
);
const SALES: Action = Action::new("load sales", "sales_load_failed", "sales_load_error");
const RECORDS: Action =
    Action::new("load sales records", "sales_load_failed", "records_load_error").quiet();
const UPLOAD: Action = Action::new(
    "upload prescription",
    "prescription_upload_failed",
    "prescription_upload_error",
);
const SALE: Action =
    Action::new("record sale", "sale_failed", "sale_error").with_success("sale_recorded");
const RECEIPT: Action =
    Action::new("send receipt", "receipt_failed", "receipt_error").with_success("receipt_sent");
const ORDER: Action = Action::new(
    "create payment order",
    "payment_order_failed",
    "payment_order_error",
)
.with_success("payment_order_created");
const VERIFY: Action = Action::new(
    "verify payment",
    "payment_verify_failed",
    "payment_verify_error",
)
.with_success("payment_verified");

const PAYMENT_CURRENCY: &str = "INR";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Sales,
    Records,
}

/// One entry of the medicine picker.
#[derive(Clone, Debug, PartialEq)]
pub struct MedicineOption {
    pub id: i64,
    pub label: String,
    pub price: f64,
    pub available: i64,
}

impl From<&AvailableMedicine> for MedicineOption {
    fn from(medicine: &AvailableMedicine) -> Self {
        Self {
            id: medicine.id,
            label: format!(
                "{} ({} available) - {}",
                medicine.name,
                medicine.quantity_available,
                format_currency(medicine.unit_price)
            ),
            price: medicine.unit_price,
            available: medicine.quantity_available,
        }
    }
}

/// Inline status line under the sale form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleMessage {
    pub text: String,
    pub success: bool,
}

/// A Razorpay order waiting for the customer to pay, with the sale it pays
/// for.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingPayment {
    pub order: PaymentOrder,
    pub sale: SaleInput,
}

/// Point-of-sale view used by pharmacy staff.
pub struct StaffDashboard<A: PharmacyApi> {
    api: Arc<A>,
    executor: Executor,
    auth_entry: String,
    pub staff: Option<Staff>,
    pub stats: StatsPanel,
    pub options: Vec<MedicineOption>,
    pub selected: Option<i64>,
    pub sale_form: Form,
    pub prescription: Option<PrescriptionFile>,
    pub total: String,
    pub sale_message: Option<SaleMessage>,
    pub last_sale: Option<i64>,
    pub pending_payment: Option<PendingPayment>,
    pub sales: Table,
    pub records: Table,
    pub section: Section,
}

impl<A: PharmacyApi> StaffDashboard<A> {
    pub fn new(api: Arc<A>, executor: Executor, auth_entry: impl Into<String>) -> Self {
        Self {
            api,
            executor,
            auth_entry: auth_entry.into(),
            staff: None,
            stats: StatsPanel::default(),
            options: Vec::new(),
            selected: None,
            sale_form: Form::new(),
            prescription: None,
            total: format_currency(0.0),
            sale_message: None,
            last_sale: None,
            pending_payment: None,
            sales: Table::new(),
            records: Table::new(),
            section: Section::default(),
        }
    }

    pub async fn load(&mut self) {
        let (staff, stats, available, sales) = futures::join!(
            self.executor.run(&STAFF, self.api.current_staff()),
            self.executor.run(&STATS, self.api.dashboard_stats()),
            self.executor.run(&AVAILABLE, self.api.available_medicines()),
            self.executor.run(&SALES, self.api.list_sales()),
        );
        if let Ok(staff) = staff {
            log::info!("Signed in as {} (#{})", staff.full_name, staff.staff_id);
            self.staff = Some(staff);
        }
        if let Ok(stats) = stats {
            self.stats = StatsPanel::from(&stats);
        }
        if let Ok(available) = available {
            self.show_options(&available);
        }
        if let Ok(sales) = sales {
            self.sales.replace_rows(sales.iter().map(sale_row).collect());
        }
    }

    pub async fn load_staff(&mut self) -> Outcome<()> {
        let staff = self.executor.run(&STAFF, self.api.current_staff()).await?;
        self.staff = Some(staff);
        Ok(())
    }

    pub async fn load_stats(&mut self) -> Outcome<()> {
        let stats = self.executor.run(&STATS, self.api.dashboard_stats()).await?;
        self.stats = StatsPanel::from(&stats);
        Ok(())
    }

    pub async fn load_available(&mut self) -> Outcome<()> {
        let available = self
            .executor
            .run(&AVAILABLE, self.api.available_medicines())
            .await?;
        self.show_options(&available);
        Ok(())
    }

    fn show_options(&mut self, available: &[AvailableMedicine]) {
        self.options = available.iter().map(MedicineOption::from).collect();
        if self
            .selected
            .is_some_and(|id| !self.options.iter().any(|o| o.id == id))
        {
            self.selected = None;
        }
        self.update_total();
    }

    pub async fn load_sales(&mut self) -> Outcome<()> {
        let sales = self.executor.run(&SALES, self.api.list_sales()).await?;
        self.sales.replace_rows(sales.iter().map(sale_row).collect());
        Ok(())
    }

    /// Fills the records section. Failures are shown in the table itself.
    pub async fn load_records(&mut self) -> Outcome<()> {
        match self.executor.run(&RECORDS, self.api.list_sales()).await {
            Ok(sales) => {
                self.show_records(&sales);
                Ok(())
            }
            Err(failure) => {
                self.records
                    .placeholder(self.executor.text("records_load_error"));
                Err(failure)
            }
        }
    }

    fn show_records(&mut self, sales: &[Sale]) {
        if sales.is_empty() {
            self.records.placeholder(self.executor.text("sales_empty"));
        } else {
            self.records
                .replace_rows(sales.iter().map(sale_row).collect::<Vec<Row>>());
        }
    }

    /// Switches the visible section; opening the records reloads them.
    pub async fn show_section(&mut self, section: Section) {
        self.section = section;
        if section == Section::Records {
            let _ = self.load_records().await;
        }
    }

    pub fn select_medicine(&mut self, id: Option<i64>) {
        self.selected = id;
        self.update_total();
    }

    pub fn set_quantity(&mut self, quantity: &str) {
        self.sale_form.set("quantity_sold", quantity);
        self.update_total();
    }

    pub fn attach_prescription(&mut self, file: PrescriptionFile) {
        self.prescription = Some(file);
    }

    /// Quantity times the selected medicine's price, or zero when either
    /// is missing.
    fn update_total(&mut self) {
        let total = self
            .selected_option()
            .zip(self.sale_form.int("quantity_sold"))
            .map(|(option, quantity)| option.price * quantity as f64)
            .unwrap_or(0.0);
        self.total = format_currency(total);
    }

    fn selected_option(&self) -> Option<&MedicineOption> {
        let id = self.selected?;
        self.options.iter().find(|option| option.id == id)
    }

    /// Records a sale. A checked prescription is uploaded first; if the
    /// upload fails the sale is not sent. Returns the new sale's id when the
    /// server reports one.
    pub async fn record_sale(&mut self) -> Outcome<Option<i64>> {
        let mut sale = self.sale_input()?;

        if let Some(file) = self.prescription.as_ref() {
            let uploaded = self
                .executor
                .run(&UPLOAD, self.api.upload_prescription(file))
                .await?;
            sale.prescription_photo_url = uploaded.file_url;
        }

        match self.executor.run(&SALE, self.api.create_sale(&sale)).await {
            Ok(ack) => {
                self.finish_sale(ack.sale_id).await;
                Ok(ack.sale_id)
            }
            Err(failure) => {
                self.sale_message = Some(SaleMessage {
                    text: failure.message().to_string(),
                    success: false,
                });
                Err(failure)
            }
        }
    }

    async fn finish_sale(&mut self, sale_id: Option<i64>) {
        match sale_id {
            Some(id) => log::info!("Sale {} recorded", id),
            None => log::info!("Sale recorded"),
        }
        self.last_sale = sale_id;
        self.sale_message = Some(SaleMessage {
            text: self.executor.text("sale_recorded"),
            success: true,
        });
        self.sale_form.reset();
        self.selected = None;
        self.prescription = None;
        self.update_total();
        let _ = self.load_available().await;
        let _ = self.load_sales().await;
        let _ = self.load_stats().await;
        if self.section == Section::Records {
            let _ = self.load_records().await;
        }
    }

    /// Validates the sale form in the order the checks are reported.
    fn sale_input(&self) -> Outcome<SaleInput> {
        let staff = self
            .staff
            .as_ref()
            .ok_or_else(|| self.executor.reject("staff_not_loaded"))?;
        let medicine_id = self
            .selected
            .ok_or_else(|| self.executor.reject("sale_select_medicine"))?;
        let quantity_sold = self
            .sale_form
            .int("quantity_sold")
            .filter(|quantity| *quantity > 0)
            .ok_or_else(|| self.executor.reject("sale_quantity_positive"))?;

        for field in ["customer_phone", "doctor_phone"] {
            let phone = self.sale_form.get(field);
            if !phone.trim().is_empty() && !validate_phone(phone) {
                return Err(self.executor.reject("sale_phone_invalid"));
            }
        }

        Ok(SaleInput {
            medicine_id,
            quantity_sold,
            doctor_name: self.sale_form.get("doctor_name").to_string(),
            doctor_phone: self.sale_form.get("doctor_phone").to_string(),
            prescription_photo_url: String::new(),
            customer_name: self.sale_form.get("customer_name").to_string(),
            customer_phone: self.sale_form.get("customer_phone").to_string(),
            sold_by: Some(staff.staff_id),
        })
    }

    pub async fn send_receipt(
        &self,
        sale_id: i64,
        channel: ReceiptChannel,
    ) -> Outcome<ReceiptResult> {
        self.executor
            .run(&RECEIPT, self.api.send_receipt(sale_id, channel))
            .await
    }

    /// Opens a Razorpay order for the sale currently in the form. Amounts
    /// are sent in paise.
    pub async fn create_payment_order(&mut self) -> Outcome<PaymentOrder> {
        let sale = self.sale_input()?;
        let price = self.selected_option().map(|o| o.price).unwrap_or_default();
        let amount = (price * sale.quantity_sold as f64 * 100.0).round() as u64;
        let request = PaymentOrderRequest {
            amount,
            currency: PAYMENT_CURRENCY.to_string(),
            receipt: Some(format!("sale_{}_{}", sale.medicine_id, uuid::Uuid::new_v4().simple())),
            notes: json!({
                "medicine_id": sale.medicine_id,
                "quantity_sold": sale.quantity_sold,
                "customer_name": sale.customer_name,
            }),
        };

        let order = self
            .executor
            .run(&ORDER, self.api.create_payment_order(&request))
            .await?;
        self.pending_payment = Some(PendingPayment {
            order: order.clone(),
            sale,
        });
        Ok(order)
    }

    /// Confirms the payment for the pending order; the server records the
    /// sale once the signature checks out.
    pub async fn verify_payment(
        &mut self,
        payment_id: &str,
        signature: &str,
    ) -> Outcome<Option<i64>> {
        let pending = self
            .pending_payment
            .as_ref()
            .ok_or_else(|| self.executor.reject("payment_no_order"))?;
        let verification = PaymentVerification {
            payment_id: payment_id.to_string(),
            order_id: pending.order.id.clone(),
            signature: signature.to_string(),
            form_data: pending.sale.clone(),
        };

        let result = self
            .executor
            .run(&VERIFY, self.api.verify_payment(&verification))
            .await?;
        self.pending_payment = None;
        self.finish_sale(result.sale_id).await;
        Ok(result.sale_id)
    }

    pub fn search(&mut self, query: &str) {
        self.sales.filter(query);
    }

    pub async fn logout(&self, host: &dyn Host) -> Outcome<()> {
        logout(self.api.as_ref(), &self.executor, host, &self.auth_entry).await
    }
}
