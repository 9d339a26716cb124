//! API request types
//!
//! Query parameters for the dashboard endpoint.

use chrono::NaiveDate;
use growth_analytics::{DashboardRequest, DateRange, PeriodType, Reduction, parse_date};
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Query parameters for `GET /api/dashboard`
///
/// Either explicit dates or a `range`, never both. Missing dates default to
/// the history start and today.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
    /// Inclusive start date (YYYY-MM-DD)
    pub start_date: Option<String>,

    /// Inclusive end date (YYYY-MM-DD)
    pub end_date: Option<String>,

    /// Relative range (e.g., "30d", "mtd", "2024-01-01,2024-01-31")
    pub range: Option<String>,

    /// Bucketing period (daily, weekly, monthly)
    pub period: Option<String>,

    /// Bucket reduction (sum, average)
    pub reduction: Option<String>,
}

impl DashboardParams {
    /// Convert to a dashboard request, resolving relative dates against `today`
    pub fn to_request(&self, state: &AppState, today: NaiveDate) -> Result<DashboardRequest> {
        let range = self.date_range(state.history_start(), today)?;

        let period = match self.period.as_deref() {
            Some(p) => {
                PeriodType::parse(p).map_err(|e| ApiError::InvalidParameter(e.to_string()))?
            }
            None => state.default_period,
        };

        let reduction = match self.reduction.as_deref() {
            Some(r) => {
                Reduction::parse(r).map_err(|e| ApiError::InvalidParameter(e.to_string()))?
            }
            None => state.default_reduction,
        };

        Ok(DashboardRequest::new(range)
            .with_period(period)
            .with_reduction(reduction))
    }

    fn date_range(&self, history_start: NaiveDate, today: NaiveDate) -> Result<DateRange> {
        if let Some(range) = self.range.as_deref() {
            if self.start_date.is_some() || self.end_date.is_some() {
                return Err(ApiError::bad_request(
                    "use either range or startDate/endDate, not both",
                ));
            }
            return DateRange::parse(range, today)
                .map_err(|e| ApiError::InvalidDateRange(e.to_string()));
        }

        let start = match self.start_date.as_deref() {
            Some(s) => parse_date(s).map_err(|e| ApiError::InvalidDateRange(e.to_string()))?,
            None => history_start,
        };
        let end = match self.end_date.as_deref() {
            Some(s) => parse_date(s).map_err(|e| ApiError::InvalidDateRange(e.to_string()))?,
            None => today,
        };

        Ok(DateRange::new(start, end))
    }
}
