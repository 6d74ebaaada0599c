//! Dashboard and analytics computations. These work on plain record slices
//! so they can be exercised without a live database; handlers fetch the
//! collections and hand them over.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::Serialize;

use crate::db::models::{Medicine, Order, OrderStatus, LOW_STOCK_THRESHOLD};
use crate::utils::time_ago;

const ACTIVITY_FEED_CAP: usize = 5;

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_stock: usize,
    pub low_stock_count: usize,
    pub expired_count: usize,
    pub total_value: String,
}

#[derive(Serialize, Debug)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub message: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "timeAgo")]
    pub time_ago: String,
    pub icon: &'static str,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct DailySales {
    pub name: String,
    pub sales: f64,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct NamedCount {
    pub name: &'static str,
    pub value: usize,
}

/// Headline inventory numbers: counts plus total value (Σ price×quantity)
/// formatted to two decimals.
pub fn dashboard_stats(medicines: &[Medicine], now: DateTime<Utc>) -> DashboardStats {
    let today = now.date_naive();
    let total_value: f64 = medicines
        .iter()
        .map(|med| med.price * med.quantity as f64)
        .sum();

    DashboardStats {
        total_stock: medicines.len(),
        low_stock_count: medicines.iter().filter(|med| med.is_low_stock()).count(),
        expired_count: medicines.iter().filter(|med| med.is_expired(today)).count(),
        total_value: format!("{total_value:.2}"),
    }
}

/// Synthesizes the dashboard activity feed: up to three low-stock alerts,
/// the two newest items and one expiry alert, sorted newest first and capped
/// at five. Expects `medicines` sorted by creation time descending.
pub fn activity_feed(medicines: &[Medicine], now: DateTime<Utc>) -> Vec<Activity> {
    let today = now.date_naive();
    let mut activities = Vec::new();

    let low_stock = medicines
        .iter()
        .filter(|med| med.quantity > 0 && med.quantity < LOW_STOCK_THRESHOLD)
        .take(3);
    for med in low_stock {
        activities.push(Activity {
            kind: "low-stock",
            title: "Low Stock Alert",
            message: format!("{} is below threshold.", med.name),
            detail: format!("{} units left", med.quantity),
            timestamp: med.updated_at,
            time_ago: time_ago(med.updated_at, now),
            icon: "alert",
        });
    }

    for med in medicines.iter().take(2) {
        activities.push(Activity {
            kind: "new-item",
            title: "New Item Added",
            message: format!("{} added to inventory.", med.name),
            detail: format!("{} units", med.quantity),
            timestamp: med.created_at,
            time_ago: time_ago(med.created_at, now),
            icon: "package",
        });
    }

    if let Some(expired) = medicines.iter().find(|med| med.is_expired(today)) {
        let timestamp = expired.expiry.and_time(NaiveTime::MIN).and_utc();
        activities.push(Activity {
            kind: "expired",
            title: "Expiry Alert",
            message: format!("{} has expired.", expired.name),
            detail: "Requires attention".to_string(),
            timestamp,
            time_ago: time_ago(timestamp, now),
            icon: "bell",
        });
    }

    activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    activities.truncate(ACTIVITY_FEED_CAP);
    activities
}

/// Sales per calendar day over the last seven days, ending today. Always
/// exactly seven entries, zero-filled; cancelled orders do not count.
pub fn sales_series(orders: &[Order], now: DateTime<Utc>) -> Vec<DailySales> {
    let today = now.date_naive();
    (0..7)
        .rev()
        .map(|offset| {
            let day = today - Duration::days(offset);
            let sales = orders
                .iter()
                .filter(|order| {
                    order.status != OrderStatus::Cancelled && order.date.date_naive() == day
                })
                .map(|order| order.total)
                .sum();
            DailySales {
                name: day.weekday().to_string(),
                sales,
            }
        })
        .collect()
}

/// In/low/out-of-stock partition of the inventory.
pub fn inventory_breakdown(medicines: &[Medicine]) -> Vec<NamedCount> {
    let out = medicines.iter().filter(|med| med.quantity == 0).count();
    let low = medicines
        .iter()
        .filter(|med| med.quantity > 0 && med.quantity < LOW_STOCK_THRESHOLD)
        .count();
    let in_stock = medicines.len() - low - out;

    vec![
        NamedCount { name: "In Stock", value: in_stock },
        NamedCount { name: "Low Stock", value: low },
        NamedCount { name: "Out of Stock", value: out },
    ]
}

/// Order counts across all five status values.
pub fn order_status_distribution(orders: &[Order]) -> Vec<NamedCount> {
    OrderStatus::ALL
        .iter()
        .map(|status| NamedCount {
            name: status.as_str(),
            value: orders.iter().filter(|o| o.status == *status).count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::PaymentMethod;
    use chrono::NaiveDate;

    fn med(name: &str, quantity: i64, price: f64, expiry: NaiveDate, created: DateTime<Utc>) -> Medicine {
        Medicine {
            id: None,
            name: name.to_string(),
            category: "General".to_string(),
            price,
            quantity,
            expiry,
            manufacturer: "Acme Pharma".to_string(),
            description: String::new(),
            image: String::new(),
            prescription_required: false,
            created_at: created,
            updated_at: created,
        }
    }

    fn order(total: f64, status: OrderStatus, date: DateTime<Utc>) -> Order {
        Order {
            id: None,
            customer: "jane@rx.com".to_string(),
            items: Vec::new(),
            total,
            status,
            notes: String::new(),
            date,
            address: "1 Main St".to_string(),
            payment_method: PaymentMethod::CashOnDelivery,
            prescription_image: None,
            created_at: date,
            updated_at: date,
        }
    }

    fn far_future() -> NaiveDate {
        NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()
    }

    #[test]
    fn stats_count_low_stock_and_total_value() {
        let now = Utc::now();
        let meds = vec![
            med("A", 5, 10.0, far_future(), now),
            med("B", 15, 20.0, far_future(), now),
            med("C", 0, 30.0, far_future(), now),
        ];
        let stats = dashboard_stats(&meds, now);
        assert_eq!(stats.total_stock, 3);
        // quantity < 10 includes zero stock
        assert_eq!(stats.low_stock_count, 2);
        assert_eq!(stats.expired_count, 0);
        assert_eq!(stats.total_value, "350.00");
    }

    #[test]
    fn stats_detect_expired_medicines() {
        let now = Utc::now();
        let yesterday = now.date_naive() - Duration::days(1);
        let meds = vec![
            med("Old", 10, 1.0, yesterday, now),
            med("Fresh", 10, 1.0, far_future(), now),
        ];
        assert_eq!(dashboard_stats(&meds, now).expired_count, 1);
    }

    #[test]
    fn activity_feed_is_sorted_capped_and_labeled() {
        let now = Utc::now();
        // Sorted newest-created first, as the handler fetches them.
        let meds = vec![
            med("New A", 50, 1.0, far_future(), now - Duration::minutes(5)),
            med("New B", 50, 1.0, far_future(), now - Duration::hours(2)),
            med("Low 1", 3, 1.0, far_future(), now - Duration::hours(3)),
            med("Low 2", 7, 1.0, far_future(), now - Duration::hours(4)),
            med("Low 3", 9, 1.0, far_future(), now - Duration::hours(5)),
            med("Low 4", 2, 1.0, far_future(), now - Duration::hours(6)),
            med("Gone", 20, 1.0, now.date_naive() - Duration::days(2), now - Duration::days(3)),
        ];
        let feed = activity_feed(&meds, now);

        assert_eq!(feed.len(), 5);
        assert!(feed.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        // Three low-stock alerts at most, even with four candidates.
        assert_eq!(feed.iter().filter(|a| a.kind == "low-stock").count(), 3);
        assert!(feed.iter().all(|a| !a.time_ago.is_empty()));

        let newest = &feed[0];
        assert_eq!(newest.kind, "new-item");
        assert_eq!(newest.time_ago, "5m");
    }

    #[test]
    fn activity_feed_reports_one_expiry_alert() {
        let now = Utc::now();
        let expired = now.date_naive() - Duration::days(1);
        let meds = vec![
            med("Old A", 20, 1.0, expired, now - Duration::hours(1)),
            med("Old B", 20, 1.0, expired, now - Duration::hours(2)),
        ];
        let feed = activity_feed(&meds, now);
        assert_eq!(feed.iter().filter(|a| a.kind == "expired").count(), 1);
    }

    #[test]
    fn sales_series_has_seven_zero_filled_entries() {
        let now = Utc::now();
        let orders = vec![
            order(25.0, OrderStatus::Pending, now),
            order(10.0, OrderStatus::Delivered, now - Duration::days(2)),
            order(99.0, OrderStatus::Cancelled, now - Duration::days(2)),
            order(40.0, OrderStatus::Processing, now - Duration::days(30)),
        ];
        let series = sales_series(&orders, now);

        assert_eq!(series.len(), 7);
        assert_eq!(series[6].sales, 25.0);
        // Cancelled orders don't count.
        assert_eq!(series[4].sales, 10.0);
        // Days without sales are zero-filled; off-window orders are ignored.
        assert_eq!(series.iter().filter(|d| d.sales == 0.0).count(), 5);
        assert_eq!(series[6].name, now.date_naive().weekday().to_string());
    }

    #[test]
    fn sales_series_sums_same_day_orders() {
        let now = Utc::now();
        let orders = vec![
            order(5.0, OrderStatus::Pending, now),
            order(7.5, OrderStatus::Delivered, now),
        ];
        assert_eq!(sales_series(&orders, now)[6].sales, 12.5);
    }

    #[test]
    fn inventory_breakdown_partitions_the_stock() {
        let now = Utc::now();
        let meds = vec![
            med("A", 5, 1.0, far_future(), now),
            med("B", 15, 1.0, far_future(), now),
            med("C", 0, 1.0, far_future(), now),
        ];
        let breakdown = inventory_breakdown(&meds);
        assert_eq!(breakdown[0], NamedCount { name: "In Stock", value: 1 });
        assert_eq!(breakdown[1], NamedCount { name: "Low Stock", value: 1 });
        assert_eq!(breakdown[2], NamedCount { name: "Out of Stock", value: 1 });
    }

    #[test]
    fn status_distribution_covers_all_five_states() {
        let now = Utc::now();
        let orders = vec![
            order(1.0, OrderStatus::Pending, now),
            order(1.0, OrderStatus::Pending, now),
            order(1.0, OrderStatus::OutForDelivery, now),
            order(1.0, OrderStatus::Cancelled, now),
        ];
        let dist = order_status_distribution(&orders);
        assert_eq!(dist.len(), 5);
        assert_eq!(dist[0], NamedCount { name: "Pending", value: 2 });
        assert_eq!(dist[1], NamedCount { name: "Processing", value: 0 });
        assert_eq!(dist[2], NamedCount { name: "Out for Delivery", value: 1 });
        assert_eq!(dist[3], NamedCount { name: "Delivered", value: 0 });
        assert_eq!(dist[4], NamedCount { name: "Cancelled", value: 1 });
    }
}
