use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// `GET /dashboard/stats` summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_products: u64,
    /// Sum over completed orders
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub new_users_today: u64,
    /// Units sold, keyed by product id
    #[serde(default)]
    pub product_sales: HashMap<String, u64>,
}

impl DashboardStats {
    /// Best selling products, highest count first (ties by product id)
    pub fn top_products(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut sales: Vec<(&str, u64)> = self
            .product_sales
            .iter()
            .map(|(id, count)| (id.as_str(), *count))
            .collect();
        sales.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        sales.truncate(limit);
        sales
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_products() {
        let stats: DashboardStats = serde_json::from_str(
            r#"{"total_users": 10, "total_orders": 4, "total_products": 3,
                "total_revenue": 4500.0, "new_users_today": 1,
                "product_sales": {"1": 2, "2": 5, "3": 2}}"#,
        )
        .unwrap();

        assert_eq!(stats.top_products(2), vec![("2", 5), ("1", 2)]);
        assert_eq!(stats.top_products(10).len(), 3);
    }
}
