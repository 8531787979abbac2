//! Admin and staff dashboard controllers and the presentation rules they
//! share.

use chrono::{Local, NaiveDate};

use crate::api::models::{DashboardStats, Medicine, Sale};
use crate::api::PharmacyApi;
use crate::executor::{Action, Executor, Outcome};
use crate::ui::{Host, Row};
use crate::utils::{format_currency, format_date};

pub mod admin;
pub mod staff;

pub use admin::AdminDashboard;
pub use staff::{Section, StaffDashboard};

/// Quantities below this are shown as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 50;
/// Quantities below this (and not low) are shown as medium stock.
pub const MEDIUM_STOCK_THRESHOLD: i64 = 100;
/// Medicines expiring within this many days are flagged.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

const NOT_AVAILABLE: &str = "N/A";

const LOGOUT: Action = Action::new("logout", "logout_failed", "logout_error");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StockLevel {
    Low,
    Medium,
    Normal,
}

impl StockLevel {
    pub fn of(quantity: i64) -> Self {
        if quantity < LOW_STOCK_THRESHOLD {
            Self::Low
        } else if quantity < MEDIUM_STOCK_THRESHOLD {
            Self::Medium
        } else {
            Self::Normal
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::Low => "text-red-600",
            Self::Medium => "text-yellow-600",
            Self::Normal => "text-green-600",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpiryStatus {
    Expired,
    ExpiringSoon,
    Fresh,
}

impl ExpiryStatus {
    pub fn of(days_left: i64) -> Self {
        if days_left <= 0 {
            Self::Expired
        } else if days_left <= EXPIRY_WARNING_DAYS {
            Self::ExpiringSoon
        } else {
            Self::Fresh
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::Expired => "text-red-600",
            Self::ExpiringSoon => "text-yellow-600",
            Self::Fresh => "text-green-600",
        }
    }
}

/// Whole days from `today` until `expiry`. Zero or negative means the
/// medicine has expired.
pub fn days_until_expiry(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

pub fn expiry_label(days_left: i64) -> String {
    match ExpiryStatus::of(days_left) {
        ExpiryStatus::Expired => "Expired".to_string(),
        _ => format!("{} days left", days_left),
    }
}

/// A medicine together with the flags derived for one render.
#[derive(Clone, Debug, PartialEq)]
pub struct MedicineView {
    pub medicine: Medicine,
    pub stock: StockLevel,
    pub days_left: i64,
    pub expiry: ExpiryStatus,
}

impl MedicineView {
    pub fn new(medicine: Medicine, today: NaiveDate) -> Self {
        let days_left = days_until_expiry(medicine.expiry_date, today);
        Self {
            stock: StockLevel::of(medicine.quantity_available),
            expiry: ExpiryStatus::of(days_left),
            days_left,
            medicine,
        }
    }

    pub fn row(&self) -> Row {
        let m = &self.medicine;
        Row::new(
            Some(m.id),
            vec![
                m.name.clone(),
                m.batch_number.clone(),
                format!("{} units", m.quantity_available),
                format_currency(m.unit_price),
                format_date(m.expiry_date),
                expiry_label(self.days_left),
                or_not_available(m.manufacturer.as_deref()),
                or_not_available(m.category.as_deref()),
            ],
        )
        .with_class(format!("{} {}", self.stock.class(), self.expiry.class()))
    }
}

pub fn sale_row(sale: &Sale) -> Row {
    let when = sale
        .sale_date
        .map(|date| date.format("%b %-d, %Y, %I:%M %p").to_string());
    let prescription = if sale.prescription_photo_url.is_some() {
        "View Prescription"
    } else {
        "No prescription"
    };
    Row::new(
        Some(sale.id),
        vec![
            or_not_available(when.as_deref()),
            or_not_available(sale.medicine_name.as_deref()),
            or_not_available(sale.batch_number.as_deref()),
            format!("{} units", sale.quantity_sold),
            format_currency(sale.total_amount),
            or_not_available(sale.doctor_name.as_deref()),
            or_not_available(sale.doctor_phone.as_deref()),
            or_not_available(sale.customer_name.as_deref()),
            or_not_available(sale.customer_phone.as_deref()),
            or_not_available(sale.sold_by_name.as_deref()),
            prescription.to_string(),
        ],
    )
}

fn or_not_available(value: Option<&str>) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Summary counters at the top of both dashboards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsPanel {
    pub total_medicines: String,
    pub low_stock: String,
    pub expiring_soon: String,
    pub sales_today: String,
    pub revenue_today: String,
}

impl Default for StatsPanel {
    fn default() -> Self {
        Self {
            total_medicines: "0".to_string(),
            low_stock: "0".to_string(),
            expiring_soon: "0".to_string(),
            sales_today: "0".to_string(),
            revenue_today: format_currency(0.0),
        }
    }
}

impl From<&DashboardStats> for StatsPanel {
    fn from(stats: &DashboardStats) -> Self {
        Self {
            total_medicines: stats.total_medicines.to_string(),
            low_stock: stats.low_stock.to_string(),
            expiring_soon: stats.expiring_soon.to_string(),
            sales_today: stats.sales_today.to_string(),
            revenue_today: format_currency(stats.revenue_today),
        }
    }
}

/// Today's date, unless a controller has been pinned to a fixed day.
fn today(pinned: Option<NaiveDate>) -> NaiveDate {
    pinned.unwrap_or_else(|| Local::now().date_naive())
}

/// Ends the session and leaves the page once the server has accepted it.
/// A failed request keeps the user where they are.
async fn logout<A>(api: &A, executor: &Executor, host: &dyn Host, entry: &str) -> Outcome<()>
where
    A: PharmacyApi + ?Sized,
{
    executor.run(&LOGOUT, api.logout()).await?;
    log::info!("Session closed, navigating to {}", entry);
    host.navigate(entry);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::api::fake::{medicine, server_error, transport_error, FakeApi};
    use crate::i18n::I18n;
    use crate::notify::Notifier;
    use crate::ui::testing::ScriptedHost;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn stock_levels() {
        assert_eq!(StockLevel::of(0), StockLevel::Low);
        assert_eq!(StockLevel::of(49), StockLevel::Low);
        assert_eq!(StockLevel::of(50), StockLevel::Medium);
        assert_eq!(StockLevel::of(99), StockLevel::Medium);
        assert_eq!(StockLevel::of(100), StockLevel::Normal);
        assert_eq!(StockLevel::Low.class(), "text-red-600");
    }

    #[test]
    fn expiry_flags() {
        let today = date(2025, 3, 10);
        assert_eq!(days_until_expiry(date(2025, 3, 10), today), 0);
        assert_eq!(ExpiryStatus::of(0), ExpiryStatus::Expired);
        assert_eq!(ExpiryStatus::of(-12), ExpiryStatus::Expired);
        assert_eq!(ExpiryStatus::of(1), ExpiryStatus::ExpiringSoon);
        assert_eq!(ExpiryStatus::of(30), ExpiryStatus::ExpiringSoon);
        assert_eq!(ExpiryStatus::of(31), ExpiryStatus::Fresh);
        assert_eq!(expiry_label(12), "12 days left");
        assert_eq!(expiry_label(-3), "Expired");
    }

    #[test]
    fn past_expiry_is_never_positive() {
        let today = date(2025, 3, 10);
        for offset in 0..400 {
            let expiry = today - chrono::Duration::days(offset);
            let view = MedicineView::new(medicine(1, "Aspirin", 10, expiry), today);
            assert!(view.days_left <= 0);
            assert_eq!(view.expiry, ExpiryStatus::Expired);
            assert_eq!(view.row().cells[5], "Expired");
        }
    }

    #[test]
    fn medicine_row_cells() {
        let today = date(2025, 3, 10);
        let view = MedicineView::new(medicine(4, "Ibuprofen", 75, date(2025, 3, 25)), today);
        let row = view.row();
        assert_eq!(row.key, Some(4));
        assert_eq!(
            row.cells,
            vec![
                "Ibuprofen",
                "B-004",
                "75 units",
                "$2.50",
                "2025-03-25",
                "15 days left",
                "N/A",
                "Pain Relief"
            ]
        );
        assert_eq!(row.class, "text-yellow-600 text-yellow-600");
    }

    #[test]
    fn sale_row_fills_missing_fields() {
        let sale = Sale {
            id: 9,
            medicine_id: Some(1),
            medicine_name: Some("Aspirin".into()),
            batch_number: None,
            quantity_sold: 3,
            total_amount: 7.5,
            customer_name: Some("Ana".into()),
            customer_phone: None,
            doctor_name: Some("".into()),
            doctor_phone: None,
            prescription_photo_url: Some("/uploads/rx.png".into()),
            sale_date: NaiveDateTime::parse_from_str("2025-01-05 14:30:00", "%Y-%m-%d %H:%M:%S")
                .ok(),
            sold_by_name: None,
            status: None,
        };
        let row = sale_row(&sale);
        assert_eq!(row.cells[0], "Jan 5, 2025, 02:30 PM");
        assert_eq!(row.cells[2], "N/A");
        assert_eq!(row.cells[4], "$7.50");
        assert_eq!(row.cells[5], "N/A");
        assert_eq!(row.cells[10], "View Prescription");
    }

    #[test]
    fn stats_panel_formats_revenue() {
        let panel = StatsPanel::from(&DashboardStats {
            total_medicines: 12,
            low_stock: 2,
            expiring_soon: 1,
            sales_today: 4,
            revenue_today: 56.2,
        });
        assert_eq!(panel.revenue_today, "$56.20");
        assert_eq!(StatsPanel::default().revenue_today, "$0.00");
    }

    #[tokio::test]
    async fn logout_navigates_on_success_only() {
        let api = FakeApi::new();
        let executor = Executor::new(Notifier::new(), I18n::default());
        let host = ScriptedHost::answering(true);

        api.fail("logout", server_error(500, None));
        assert!(logout(&api, &executor, &host, "auth-admin.html").await.is_err());
        assert!(host.visited.borrow().is_empty());

        api.fail("logout", transport_error());
        assert!(logout(&api, &executor, &host, "auth-admin.html").await.is_err());
        assert!(host.visited.borrow().is_empty());

        api.failures.lock().unwrap().clear();
        logout(&api, &executor, &host, "auth-admin.html").await.unwrap();
        assert_eq!(*host.visited.borrow(), vec!["auth-admin.html".to_string()]);
    }
}
