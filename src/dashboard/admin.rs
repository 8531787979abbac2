use std::sync::Arc;

use chrono::NaiveDate;

use super::{logout, today, MedicineView, StatsPanel};
use crate::api::models::{Medicine, MedicineInput};
use crate::api::PharmacyApi;
use crate::executor::{Action, Executor, Outcome};
use crate::services::{Clock, ClockFace};
use crate::ui::{Form, Host, Table};
use crate::utils::format_date;

const STATS: Action =
    Action::new("load dashboard stats", "stats_load_failed", "stats_load_error").quiet();
const LIST: Action = Action::new("load medicines", "medicines_load_failed", "medicines_load_error");
const DETAILS: Action =
    Action::new("load medicine details", "medicine_details_failed", "medicine_details_error");
const ADD: Action = Action::new("add medicine", "medicine_add_failed", "medicine_add_error")
    .with_success("medicine_added");
const UPDATE: Action =
    Action::new("update medicine", "medicine_update_failed", "medicine_update_error")
        .with_success("medicine_updated");
const DELETE: Action =
    Action::new("delete medicine", "medicine_delete_failed", "medicine_delete_error")
        .with_success("medicine_deleted");

/// Fields every medicine form must carry before it is submitted.
const REQUIRED_FIELDS: [&str; 5] = [
    "medicine_name",
    "batch_number",
    "expiry_date",
    "quantity_available",
    "unit_price",
];

/// Inventory management view for administrators.
pub struct AdminDashboard<A: PharmacyApi> {
    api: Arc<A>,
    executor: Executor,
    auth_entry: String,
    pinned_today: Option<NaiveDate>,
    clock: Option<Clock>,
    pub stats: StatsPanel,
    pub medicines: Vec<MedicineView>,
    pub table: Table,
    pub add_form: Form,
    pub add_open: bool,
    pub edit_form: Form,
    /// The medicine whose edit modal is open.
    pub editing: Option<i64>,
}

impl<A: PharmacyApi> AdminDashboard<A> {
    pub fn new(api: Arc<A>, executor: Executor, auth_entry: impl Into<String>) -> Self {
        Self {
            api,
            executor,
            auth_entry: auth_entry.into(),
            pinned_today: None,
            clock: None,
            stats: StatsPanel::default(),
            medicines: Vec::new(),
            table: Table::new(),
            add_form: Form::new(),
            add_open: false,
            edit_form: Form::new(),
            editing: None,
        }
    }

    /// Evaluates expiry against a fixed day instead of the local date.
    pub fn pin_today(&mut self, date: NaiveDate) {
        self.pinned_today = Some(date);
    }

    pub fn attach_clock(&mut self, clock: Clock) {
        self.clock = Some(clock);
    }

    /// The wall clock shown in the header, blank until a ticker is attached.
    pub fn clock(&self) -> ClockFace {
        self.clock.as_ref().map(Clock::face).unwrap_or_default()
    }

    /// First load of the page: counters and the medicine list together.
    pub async fn load(&mut self) {
        let (stats, medicines) = futures::join!(
            self.executor.run(&STATS, self.api.dashboard_stats()),
            self.executor.run(&LIST, self.api.list_medicines()),
        );
        if let Ok(stats) = stats {
            self.stats = StatsPanel::from(&stats);
        }
        if let Ok(medicines) = medicines {
            self.show_medicines(medicines);
        }
    }

    pub async fn load_stats(&mut self) -> Outcome<()> {
        let stats = self.executor.run(&STATS, self.api.dashboard_stats()).await?;
        self.stats = StatsPanel::from(&stats);
        Ok(())
    }

    /// Replaces the table on success; on failure the previous rows stay.
    pub async fn load_medicines(&mut self) -> Outcome<()> {
        let medicines = self.executor.run(&LIST, self.api.list_medicines()).await?;
        self.show_medicines(medicines);
        Ok(())
    }

    fn show_medicines(&mut self, medicines: Vec<Medicine>) {
        let today = today(self.pinned_today);
        self.medicines = medicines
            .into_iter()
            .map(|medicine| MedicineView::new(medicine, today))
            .collect();
        self.table
            .replace_rows(self.medicines.iter().map(MedicineView::row).collect());
        log::info!("Showing {} medicines", self.medicines.len());
    }

    pub fn open_add(&mut self) {
        self.add_open = true;
    }

    pub fn close_add(&mut self) {
        self.add_open = false;
        self.add_form.reset();
    }

    pub async fn add_medicine(&mut self) -> Outcome<()> {
        let input = self.medicine_input(&self.add_form)?;
        self.executor
            .run(&ADD, self.api.create_medicine(&input))
            .await?;
        self.close_add();
        self.refresh().await;
        Ok(())
    }

    /// Fetches one medicine and fills the edit form with it.
    pub async fn open_edit(&mut self, id: i64) -> Outcome<()> {
        let medicine = self.executor.run(&DETAILS, self.api.get_medicine(id)).await?;
        self.edit_form = medicine_form(&medicine);
        self.editing = Some(medicine.id);
        Ok(())
    }

    pub fn close_edit(&mut self) {
        self.editing = None;
        self.edit_form.reset();
    }

    pub async fn update_medicine(&mut self) -> Outcome<()> {
        let Some(id) = self.editing else {
            return Err(self.executor.reject("medicine_edit_not_open"));
        };
        let input = self.medicine_input(&self.edit_form)?;
        self.executor
            .run(&UPDATE, self.api.update_medicine(id, &input))
            .await?;
        self.close_edit();
        self.refresh().await;
        Ok(())
    }

    /// Deletes after the user confirms. Returns `false` when they decline,
    /// in which case nothing is sent.
    pub async fn delete_medicine(&mut self, id: i64, host: &dyn Host) -> Outcome<bool> {
        let prompt = self.executor.text("medicine_delete_confirm");
        if !host.confirm(&prompt).await {
            log::info!("Deletion of medicine {} cancelled", id);
            return Ok(false);
        }
        self.executor
            .run(&DELETE, self.api.delete_medicine(id))
            .await?;
        self.refresh().await;
        Ok(true)
    }

    pub fn search(&mut self, query: &str) {
        self.table.filter(query);
    }

    pub async fn logout(&self, host: &dyn Host) -> Outcome<()> {
        logout(self.api.as_ref(), &self.executor, host, &self.auth_entry).await
    }

    async fn refresh(&mut self) {
        let _ = self.load_medicines().await;
        let _ = self.load_stats().await;
    }

    fn medicine_input(&self, form: &Form) -> Outcome<MedicineInput> {
        if REQUIRED_FIELDS.iter().any(|field| form.is_blank(field)) {
            return Err(self.executor.reject("medicine_fields_required"));
        }
        let quantity_available = form
            .int("quantity_available")
            .ok_or_else(|| self.executor.reject("medicine_quantity_invalid"))?;
        let unit_price = form
            .float("unit_price")
            .ok_or_else(|| self.executor.reject("medicine_price_invalid"))?;

        Ok(MedicineInput {
            medicine_name: form.get("medicine_name").trim().to_string(),
            batch_number: form.get("batch_number").trim().to_string(),
            expiry_date: form.get("expiry_date").to_string(),
            date_of_purchase: form.get("date_of_purchase").to_string(),
            quantity_available,
            unit_price,
            manufacturer: form.get("manufacturer").to_string(),
            category: form.get("category").to_string(),
            description: form.get("description").to_string(),
        })
    }
}

fn medicine_form(medicine: &Medicine) -> Form {
    Form::new()
        .with("medicine_name", medicine.name.as_str())
        .with("batch_number", medicine.batch_number.as_str())
        .with("expiry_date", format_date(medicine.expiry_date))
        .with(
            "date_of_purchase",
            medicine.date_of_purchase.map(format_date).unwrap_or_default(),
        )
        .with("quantity_available", medicine.quantity_available.to_string())
        .with("unit_price", medicine.unit_price.to_string())
        .with("manufacturer", medicine.manufacturer.clone().unwrap_or_default())
        .with("category", medicine.category.clone().unwrap_or_default())
        .with("description", medicine.description.clone().unwrap_or_default())
}
