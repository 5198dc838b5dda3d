// ABOUTME: Dashboard loader that runs every section query concurrently
// ABOUTME: Keeps each section's result independent and reports failed sections by component
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::sections::{
    DashboardSection, KeyMetricsRow, RevenueChartRow, RevenueMetricsRow,
    SubscriptionDistributionRow, TopOrganizationRow, TopProductRow,
};
use crate::query::{QueryClient, QueryData};
use serde::Serialize;
use tracing::{error, info};

/// Display message for a failed section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionError {
    /// Failed section
    pub section: DashboardSection,
    /// `Error in <Component>: <message>`
    pub message: String,
}

impl SectionError {
    fn new(section: DashboardSection, error_message: &str) -> Self {
        Self {
            section,
            message: format!("Error in {}: {error_message}", section.component_name()),
        }
    }
}

/// Rows of any one section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionRows {
    /// Totals
    KeyMetrics(Vec<KeyMetricsRow>),
    /// Revenue and profit sums
    RevenueMetrics(Vec<RevenueMetricsRow>),
    /// Daily revenue
    RevenueChart(Vec<RevenueChartRow>),
    /// Organizations by revenue
    TopOrganizations(Vec<TopOrganizationRow>),
    /// Products by revenue
    TopProducts(Vec<TopProductRow>),
    /// Organizations per tier
    SubscriptionDistribution(Vec<SubscriptionDistributionRow>),
}

/// Results of every dashboard section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    /// Totals
    pub key_metrics: QueryData<Vec<KeyMetricsRow>>,
    /// Revenue and profit sums
    pub revenue_metrics: QueryData<Vec<RevenueMetricsRow>>,
    /// Daily revenue
    pub revenue_chart: QueryData<Vec<RevenueChartRow>>,
    /// Organizations by revenue
    pub top_organizations: QueryData<Vec<TopOrganizationRow>>,
    /// Products by revenue
    pub top_products: QueryData<Vec<TopProductRow>>,
    /// Organizations per tier
    pub subscription_distribution: QueryData<Vec<SubscriptionDistributionRow>>,
    /// Display messages for failed sections, in page order
    pub errors: Vec<SectionError>,
}

/// Loads dashboard sections through a [`QueryClient`]
pub struct DashboardLoader;

impl DashboardLoader {
    /// Run all six section queries concurrently
    ///
    /// A failing section never affects the others.
    pub async fn load(client: &QueryClient) -> DashboardData {
        let (
            key_metrics,
            revenue_metrics,
            revenue_chart,
            top_organizations,
            top_products,
            subscription_distribution,
        ) = tokio::join!(
            client.execute::<KeyMetricsRow>(DashboardSection::KeyMetrics.sql(), &[]),
            client.execute::<RevenueMetricsRow>(DashboardSection::RevenueMetrics.sql(), &[]),
            client.execute::<RevenueChartRow>(DashboardSection::RevenueChart.sql(), &[]),
            client.execute::<TopOrganizationRow>(DashboardSection::TopOrganizations.sql(), &[]),
            client.execute::<TopProductRow>(DashboardSection::TopProducts.sql(), &[]),
            client.execute::<SubscriptionDistributionRow>(
                DashboardSection::SubscriptionDistribution.sql(),
                &[]
            ),
        );

        let errors = DashboardSection::ALL
            .into_iter()
            .filter_map(|section| {
                let message = match section {
                    DashboardSection::KeyMetrics => key_metrics.error_message(),
                    DashboardSection::RevenueMetrics => revenue_metrics.error_message(),
                    DashboardSection::RevenueChart => revenue_chart.error_message(),
                    DashboardSection::TopOrganizations => top_organizations.error_message(),
                    DashboardSection::TopProducts => top_products.error_message(),
                    DashboardSection::SubscriptionDistribution => {
                        subscription_distribution.error_message()
                    }
                };
                message.map(|message| report(section, message))
            })
            .collect::<Vec<_>>();

        info!(
            executor = client.executor_name(),
            failed_sections = errors.len(),
            "Dashboard loaded"
        );

        DashboardData {
            key_metrics,
            revenue_metrics,
            revenue_chart,
            top_organizations,
            top_products,
            subscription_distribution,
            errors,
        }
    }

    /// Run a single section query
    pub async fn load_section(client: &QueryClient, section: DashboardSection) -> QueryData<SectionRows> {
        let sql = section.sql();
        let data = match section {
            DashboardSection::KeyMetrics => client
                .execute(sql, &[])
                .await
                .map(SectionRows::KeyMetrics),
            DashboardSection::RevenueMetrics => client
                .execute(sql, &[])
                .await
                .map(SectionRows::RevenueMetrics),
            DashboardSection::RevenueChart => client
                .execute(sql, &[])
                .await
                .map(SectionRows::RevenueChart),
            DashboardSection::TopOrganizations => client
                .execute(sql, &[])
                .await
                .map(SectionRows::TopOrganizations),
            DashboardSection::TopProducts => client
                .execute(sql, &[])
                .await
                .map(SectionRows::TopProducts),
            DashboardSection::SubscriptionDistribution => client
                .execute(sql, &[])
                .await
                .map(SectionRows::SubscriptionDistribution),
        };
        if let Some(message) = data.error_message() {
            report(section, message);
        }
        data
    }
}

/// Log a failed section and build its display message
fn report(section: DashboardSection, message: &str) -> SectionError {
    error!(
        section = section.slug(),
        "Failed to execute query in {}: {message}",
        section.component_name()
    );
    SectionError::new(section, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_error_message() {
        let error = SectionError::new(DashboardSection::TopProducts, "Request timeout");
        assert_eq!(error.message, "Error in TopProducts: Request timeout");
    }

    #[test]
    fn test_report_names_the_component() {
        let error = report(DashboardSection::RevenueChart, "connection refused");
        assert_eq!(error.section, DashboardSection::RevenueChart);
        assert_eq!(error.message, "Error in RevenueChart: connection refused");
    }
}
