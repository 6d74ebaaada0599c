use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Quantity below which a medicine counts as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Timestamps are stored as fixed-width RFC 3339 strings (millisecond
/// precision, `Z` suffix). The fixed width keeps lexicographic sorts on
/// `createdAt`/`date` in chronological order; chrono's default rendering
/// varies the fractional-second width and would break that.
pub mod datetime_string {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(dt: DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(*dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    #[default]
    Admin,
}

impl Role {
    /// Role assigned to a newly registered admin given how many admins
    /// already exist. The very first admin becomes Super Admin.
    pub fn for_existing_count(count: u64) -> Self {
        if count == 0 {
            Role::SuperAdmin
        } else {
            Role::Admin
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Admin => "Admin",
        }
    }

    /// The Super Admin account can never be deleted.
    pub fn can_be_deleted(&self) -> bool {
        !matches!(self, Role::SuperAdmin)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: Role,
}

/// Admin without the password hash, for API responses.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdminPublic {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
}

impl From<Admin> for AdminPublic {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            phone: admin.phone,
            role: admin.role,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub quantity: i64,
    pub expiry: NaiveDate,
    pub manufacturer: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub prescription_required: bool,
    #[serde(with = "datetime_string")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_string")]
    pub updated_at: DateTime<Utc>,
}

impl Medicine {
    pub fn is_low_stock(&self) -> bool {
        self.quantity < LOW_STOCK_THRESHOLD
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry < today
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// An order can be cancelled until it leaves the pharmacy or reaches a
    /// terminal state.
    pub fn can_cancel(&self) -> bool {
        !matches!(
            self,
            OrderStatus::Delivered | OrderStatus::OutForDelivery | OrderStatus::Cancelled
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
}

impl FromStr for PaymentMethod {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Credit Card" => Ok(PaymentMethod::CreditCard),
            "Cash on Delivery" => Ok(PaymentMethod::CashOnDelivery),
            _ => Err("Allowed payment methods: Credit Card, Cash on Delivery"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medicine_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub customer: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total: f64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(with = "datetime_string")]
    pub date: DateTime<Utc>,
    pub address: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub prescription_image: Option<String>,
    #[serde(with = "datetime_string")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_string")]
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_admin_becomes_super_admin() {
        assert_eq!(Role::for_existing_count(0), Role::SuperAdmin);
        assert_eq!(Role::for_existing_count(1), Role::Admin);
        assert_eq!(Role::for_existing_count(42), Role::Admin);
    }

    #[test]
    fn super_admin_cannot_be_deleted() {
        assert!(!Role::SuperAdmin.can_be_deleted());
        assert!(Role::Admin.can_be_deleted());
    }

    #[test]
    fn timestamp_strings_sort_chronologically() {
        use chrono::{Duration, TimeZone};

        let base = Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap();
        let earlier = datetime_string::format(base);
        let later = datetime_string::format(base + Duration::milliseconds(1));

        // Fixed width even when the fraction is all zeros.
        assert!(earlier.ends_with(".000Z"));
        assert_eq!(earlier.len(), later.len());
        assert!(earlier < later);
    }

    #[test]
    fn order_timestamps_round_trip_through_serde() {
        use chrono::TimeZone;

        let date = Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap();
        let order = Order {
            id: None,
            customer: "jane@rx.com".to_string(),
            items: Vec::new(),
            total: 12.5,
            status: OrderStatus::Pending,
            notes: String::new(),
            date,
            address: "1 Main St".to_string(),
            payment_method: PaymentMethod::CashOnDelivery,
            prescription_image: None,
            created_at: date,
            updated_at: date,
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["date"], "2026-08-26T12:00:00.000Z");

        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back.date, date);
    }

    #[test]
    fn cancellation_guard() {
        assert!(OrderStatus::Pending.can_cancel());
        assert!(OrderStatus::Processing.can_cancel());
        assert!(!OrderStatus::OutForDelivery.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
    }

    #[test]
    fn status_serializes_to_display_labels() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn payment_method_from_str() {
        assert_eq!(
            "Cash on Delivery".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CashOnDelivery
        );
        assert!("PayPal".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn role_round_trips_through_serde() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"Super Admin\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::SuperAdmin);
    }
}
