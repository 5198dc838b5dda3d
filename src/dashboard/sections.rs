// ABOUTME: Dashboard section catalog pairing each read-only query with its row shape
// ABOUTME: Holds the SQL text, typed rows and presentation metadata for all six sections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::query::coercion::parse_number;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Organization, user, product and sale totals
pub const KEY_METRICS_QUERY: &str = r"
  SELECT
    COUNT(DISTINCT o.organization_id) as total_organizations,
    COUNT(DISTINCT u.user_id) as total_users,
    COUNT(DISTINCT p.product_id) as total_products,
    COUNT(DISTINCT s.sale_id) as total_sales
  FROM organizations o
  LEFT JOIN users u ON o.organization_id = u.organization_id
  LEFT JOIN products p ON o.organization_id = p.organization_id
  LEFT JOIN sales s ON o.organization_id = s.organization_id
";

/// Revenue, cost and profit sums over the last 30 days
pub const REVENUE_METRICS_QUERY: &str = r"
  SELECT
    SUM(total_revenue) as total_revenue,
    SUM(total_cost) as total_cost,
    SUM(gross_profit) as total_gross_profit,
    SUM(net_profit) as total_net_profit
  FROM revenue
  WHERE date >= CURRENT_DATE - INTERVAL '30 days'
";

/// Daily revenue over the last 30 days
pub const REVENUE_CHART_QUERY: &str = r"
  SELECT date, total_revenue
  FROM revenue
  WHERE date >= CURRENT_DATE - INTERVAL '30 days'
  ORDER BY date
";

/// Ten organizations with the highest revenue over the last 30 days
pub const TOP_ORGANIZATIONS_QUERY: &str = r"
  SELECT
    o.organization_name,
    SUM(r.total_revenue) as revenue
  FROM organizations o
  JOIN revenue r ON o.organization_id = r.organization_id
  WHERE r.date >= CURRENT_DATE - INTERVAL '30 days'
  GROUP BY o.organization_id, o.organization_name
  ORDER BY revenue DESC
  LIMIT 10
";

/// Five products with the highest revenue over the last 30 days
pub const TOP_PRODUCTS_QUERY: &str = r"
  SELECT
    p.product_name,
    SUM(si.quantity) as total_quantity,
    SUM(si.total_price) as total_revenue
  FROM products p
  JOIN sale_items si ON p.product_id = si.product_id
  JOIN sales s ON si.sale_id = s.sale_id
  WHERE s.sale_date >= CURRENT_DATE - INTERVAL '30 days'
  GROUP BY p.product_id, p.product_name
  ORDER BY total_revenue DESC
  LIMIT 5
";

/// Organization count per subscription tier
pub const SUBSCRIPTION_DISTRIBUTION_QUERY: &str = r"
  SELECT
    subscription_tier,
    COUNT(*) as organization_count
  FROM organizations
  GROUP BY subscription_tier
  ORDER BY organization_count DESC
";

/// Numeric column as delivered by an executor
///
/// The direct executor coerces numeric wire types, but a proxy backed by a
/// driver without type parsers sends `int8` and `numeric` as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumericValue {
    Number(f64),
    Text(String),
}

impl NumericValue {
    fn into_number<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(value) => Ok(value),
            Self::Text(text) => parse_number(&text)
                .filter(|value| value.is_finite())
                .ok_or_else(|| E::custom(format!("invalid numeric value: '{text}'"))),
        }
    }
}

fn deserialize_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    NumericValue::deserialize(deserializer)?.into_number()
}

fn deserialize_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NumericValue>::deserialize(deserializer)?
        .map(NumericValue::into_number)
        .transpose()
}

/// Row of [`KEY_METRICS_QUERY`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetricsRow {
    /// Registered organizations
    #[serde(deserialize_with = "deserialize_number")]
    pub total_organizations: f64,
    /// Registered users
    #[serde(deserialize_with = "deserialize_number")]
    pub total_users: f64,
    /// Available products
    #[serde(deserialize_with = "deserialize_number")]
    pub total_products: f64,
    /// Completed sales
    #[serde(deserialize_with = "deserialize_number")]
    pub total_sales: f64,
}

/// Row of [`REVENUE_METRICS_QUERY`]; sums are `null` when no revenue rows match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueMetricsRow {
    /// Revenue
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub total_revenue: Option<f64>,
    /// Cost
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub total_cost: Option<f64>,
    /// Gross profit
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub total_gross_profit: Option<f64>,
    /// Net profit
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub total_net_profit: Option<f64>,
}

/// Row of [`REVENUE_CHART_QUERY`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueChartRow {
    /// Calendar date (`YYYY-MM-DD`)
    pub date: String,
    /// Revenue on that date
    #[serde(deserialize_with = "deserialize_number")]
    pub total_revenue: f64,
}

/// Row of [`TOP_ORGANIZATIONS_QUERY`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopOrganizationRow {
    /// Organization display name
    pub organization_name: String,
    /// Revenue over the window
    #[serde(deserialize_with = "deserialize_number")]
    pub revenue: f64,
}

/// Row of [`TOP_PRODUCTS_QUERY`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProductRow {
    /// Product display name
    pub product_name: String,
    /// Units sold
    #[serde(deserialize_with = "deserialize_number")]
    pub total_quantity: f64,
    /// Revenue over the window
    #[serde(deserialize_with = "deserialize_number")]
    pub total_revenue: f64,
}

/// Row of [`SUBSCRIPTION_DISTRIBUTION_QUERY`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionDistributionRow {
    /// Tier name; `null` groups organizations without a tier
    pub subscription_tier: Option<String>,
    /// Organizations on that tier
    #[serde(deserialize_with = "deserialize_number")]
    pub organization_count: f64,
}

/// How a section is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Row of summary cards
    Cards,
    /// Chart card
    Chart,
    /// Table card
    Table,
}

/// One dashboard section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardSection {
    /// Totals cards
    KeyMetrics,
    /// Revenue and profit cards
    RevenueMetrics,
    /// Daily revenue chart
    RevenueChart,
    /// Organizations by revenue
    TopOrganizations,
    /// Products by revenue
    TopProducts,
    /// Organizations per tier
    SubscriptionDistribution,
}

impl DashboardSection {
    /// Every section in page order
    pub const ALL: [Self; 6] = [
        Self::KeyMetrics,
        Self::RevenueMetrics,
        Self::RevenueChart,
        Self::SubscriptionDistribution,
        Self::TopOrganizations,
        Self::TopProducts,
    ];

    /// URL identifier
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::KeyMetrics => "key_metrics",
            Self::RevenueMetrics => "revenue_metrics",
            Self::RevenueChart => "revenue_chart",
            Self::TopOrganizations => "top_organizations",
            Self::TopProducts => "top_products",
            Self::SubscriptionDistribution => "subscription_distribution",
        }
    }

    /// Component name used in error reports
    #[must_use]
    pub const fn component_name(self) -> &'static str {
        match self {
            Self::KeyMetrics => "KeyMetrics",
            Self::RevenueMetrics => "RevenueMetrics",
            Self::RevenueChart => "RevenueChart",
            Self::TopOrganizations => "TopOrganizations",
            Self::TopProducts => "TopProducts",
            Self::SubscriptionDistribution => "SubscriptionDistribution",
        }
    }

    /// Card title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::KeyMetrics => "Key Metrics",
            Self::RevenueMetrics => "Revenue Metrics",
            Self::RevenueChart => "Revenue Trend",
            Self::TopOrganizations => "Top Organizations",
            Self::TopProducts => "Top Products",
            Self::SubscriptionDistribution => "Subscription Distribution",
        }
    }

    /// Card description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::KeyMetrics => "Total organizations, users, products and completed sales",
            Self::RevenueMetrics => "Revenue, cost and profit for the last 30 days",
            Self::RevenueChart => "Daily revenue for the last 30 days",
            Self::TopOrganizations => "Top 10 organizations by revenue in the last 30 days",
            Self::TopProducts => "Top 5 selling products by revenue in the last 30 days",
            Self::SubscriptionDistribution => {
                "Distribution of organizations across subscription tiers"
            }
        }
    }

    /// Presentation style
    #[must_use]
    pub const fn kind(self) -> SectionKind {
        match self {
            Self::KeyMetrics | Self::RevenueMetrics => SectionKind::Cards,
            Self::RevenueChart | Self::SubscriptionDistribution => SectionKind::Chart,
            Self::TopOrganizations | Self::TopProducts => SectionKind::Table,
        }
    }

    /// Read-only SQL text
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::KeyMetrics => KEY_METRICS_QUERY,
            Self::RevenueMetrics => REVENUE_METRICS_QUERY,
            Self::RevenueChart => REVENUE_CHART_QUERY,
            Self::TopOrganizations => TOP_ORGANIZATIONS_QUERY,
            Self::TopProducts => TOP_PRODUCTS_QUERY,
            Self::SubscriptionDistribution => SUBSCRIPTION_DISTRIBUTION_QUERY,
        }
    }

    /// Catalog entry for this section
    #[must_use]
    pub const fn info(self) -> SectionInfo {
        SectionInfo {
            id: self,
            component: self.component_name(),
            title: self.title(),
            description: self.description(),
            kind: self.kind(),
        }
    }
}

impl fmt::Display for DashboardSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Unknown section identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown dashboard section '{0}'")]
pub struct UnknownSection(pub String);

impl FromStr for DashboardSection {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_lowercase();
        Self::ALL
            .into_iter()
            .find(|section| section.slug() == normalized)
            .ok_or_else(|| UnknownSection(s.to_owned()))
    }
}

/// Serializable catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionInfo {
    /// Section identifier
    pub id: DashboardSection,
    /// Component name
    pub component: &'static str,
    /// Card title
    pub title: &'static str,
    /// Card description
    pub description: &'static str,
    /// Presentation style
    pub kind: SectionKind,
}
