//! Analytics ("data cube").
//!
//! Every query takes a `begin_date` / `end_date` pair in `yyyymmdd`. Daily
//! endpoints want both dates equal, weekly ones a Monday to Sunday span,
//! monthly ones the first and last day of a month.

use std::sync::Arc;

use serde::Serialize;

use crate::error::WechatError;
use crate::kernel::{ApiResponse, BaseClient, Component, ServiceContainer};

#[derive(Serialize)]
struct DateRange<'a> {
    begin_date: &'a str,
    end_date: &'a str,
}

/// The `DataCube` component.
#[derive(Debug, Clone)]
pub struct DataCubeApi {
    base: BaseClient,
}

impl DataCubeApi {
    pub fn new(container: &Arc<ServiceContainer>) -> Result<Self, WechatError> {
        Ok(Self {
            base: BaseClient::new(container)?,
        })
    }

    pub async fn summary_trend(&self, from: &str, to: &str) -> Result<ApiResponse, WechatError> {
        self.query("/datacube/getweanalysisappiddailysummarytrend", from, to)
            .await
    }

    pub async fn daily_visit_trend(&self, from: &str, to: &str) -> Result<ApiResponse, WechatError> {
        self.query("/datacube/getweanalysisappiddailyvisittrend", from, to)
            .await
    }

    pub async fn weekly_visit_trend(&self, from: &str, to: &str) -> Result<ApiResponse, WechatError> {
        self.query("/datacube/getweanalysisappidweeklyvisittrend", from, to)
            .await
    }

    pub async fn monthly_visit_trend(&self, from: &str, to: &str) -> Result<ApiResponse, WechatError> {
        self.query("/datacube/getweanalysisappidmonthlyvisittrend", from, to)
            .await
    }

    pub async fn daily_retain_info(&self, from: &str, to: &str) -> Result<ApiResponse, WechatError> {
        self.query("/datacube/getweanalysisappiddailyretaininfo", from, to)
            .await
    }

    pub async fn visit_distribution(&self, from: &str, to: &str) -> Result<ApiResponse, WechatError> {
        self.query("/datacube/getweanalysisappidvisitdistribution", from, to)
            .await
    }

    pub async fn visit_page(&self, from: &str, to: &str) -> Result<ApiResponse, WechatError> {
        self.query("/datacube/getweanalysisappidvisitpage", from, to)
            .await
    }

    pub async fn user_portrait(&self, from: &str, to: &str) -> Result<ApiResponse, WechatError> {
        self.query("/datacube/getweanalysisappiduserportrait", from, to)
            .await
    }

    async fn query(&self, endpoint: &str, from: &str, to: &str) -> Result<ApiResponse, WechatError> {
        self.base
            .http_post_json(
                endpoint,
                &DateRange {
                    begin_date: from,
                    end_date: to,
                },
            )
            .await
    }
}

impl Component for DataCubeApi {
    fn name(&self) -> &'static str {
        "DataCube"
    }
}
