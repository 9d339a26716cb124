//! Warehouse-backed series source
//!
//! Each dataset is one query: a generated day list LEFT JOINed against the
//! per-metric aggregates, so every day in the range has a row.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use super::{Dataset, SeriesSet, SeriesSource, parse_series_set};
use crate::error::{AnalyticsError, Result};
use crate::range::DateRange;
use growth_warehouse::{ParamValue, Query, WarehouseBackend};

/// Table locations and query settings
#[derive(Debug, Clone)]
pub struct WarehouseSourceConfig {
    /// Project holding the datasets
    pub project_id: String,
    /// GA4 export dataset of the public site
    pub site_dataset: String,
    /// GA4 export dataset of the member site
    pub member_dataset: String,
    /// `dataset.table` with registration, conversion and first order timestamps
    pub users_table: String,
    /// `dataset.table` of shop actions (access, cart, order)
    pub action_log_table: String,
    /// `dataset.table` of LINE friend changes
    pub line_users_table: String,
    /// `page_location` LIKE pattern identifying member page views
    pub member_page_pattern: String,
    /// Offset applied when turning timestamps into calendar dates
    pub utc_offset_hours: i32,
}

impl WarehouseSourceConfig {
    /// Config with default table names for a project
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            site_dataset: "analytics_site".to_string(),
            member_dataset: "analytics_member".to_string(),
            users_table: "admin_user.admin_user_data".to_string(),
            action_log_table: "user_action_log.user_action_log_raw_latest".to_string(),
            line_users_table: "firestore_export_user.users_raw_changelog".to_string(),
            member_page_pattern: "%/auth/register%".to_string(),
            utc_offset_hours: 9,
        }
    }

    /// Check every interpolated identifier
    pub fn validate(&self) -> Result<()> {
        let identifiers = [
            ("project_id", &self.project_id),
            ("site_dataset", &self.site_dataset),
            ("member_dataset", &self.member_dataset),
            ("users_table", &self.users_table),
            ("action_log_table", &self.action_log_table),
            ("line_users_table", &self.line_users_table),
        ];

        for (field, value) in identifiers {
            if !is_identifier(value) {
                return Err(AnalyticsError::Source(format!(
                    "{} is not a valid table identifier: {:?}",
                    field, value
                )));
            }
        }

        Ok(())
    }

    /// Timezone string understood by the warehouse, e.g. `+09:00`
    fn timezone(&self) -> String {
        if self.utc_offset_hours < 0 {
            format!("-{:02}:00", self.utc_offset_hours.unsigned_abs())
        } else {
            format!("+{:02}:00", self.utc_offset_hours)
        }
    }

    fn table(&self, path: &str) -> String {
        format!("`{}.{}`", self.project_id, path)
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Series source that queries the warehouse
pub struct WarehouseSource {
    backend: Arc<dyn WarehouseBackend>,
    config: WarehouseSourceConfig,
}

impl WarehouseSource {
    /// Create a source over a backend
    pub fn new(backend: Arc<dyn WarehouseBackend>, config: WarehouseSourceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { backend, config })
    }

    /// Build the query for a dataset
    pub fn build_query(&self, dataset: Dataset, range: &DateRange) -> Query {
        let sql = match dataset {
            Dataset::SiteFunnel => self.site_funnel_sql(),
            Dataset::ShopFunnel => self.shop_funnel_sql(),
            Dataset::TrafficSources => self.traffic_sql(),
        };

        let query = Query::new(sql)
            .bind_date("start_date", range.start)
            .bind_date("end_date", range.end);

        match dataset {
            Dataset::SiteFunnel => query.bind(
                "member_page_pattern",
                ParamValue::String(self.config.member_page_pattern.clone()),
            ),
            _ => query,
        }
    }

    fn day_list_cte() -> &'static str {
        "day_list AS (\n  \
           SELECT day AS date\n  \
           FROM UNNEST(GENERATE_DATE_ARRAY(@start_date, @end_date, INTERVAL 1 DAY)) AS day\n\
         )"
    }

    fn site_funnel_sql(&self) -> String {
        let tz = self.config.timezone();
        let users = self.config.table(&self.config.users_table);
        let site_events = self.config.table(&format!("{}.events_*", self.config.site_dataset));
        let member_events = self
            .config
            .table(&format!("{}.events_*", self.config.member_dataset));

        let user_count = |column: &str, alias: &str| {
            format!(
                "{alias} AS (\n  \
                   SELECT DATE({column}, '{tz}') AS dt, COUNT(*) AS n\n  \
                   FROM {users}\n  \
                   WHERE DATE({column}, '{tz}') BETWEEN @start_date AND @end_date\n  \
                   GROUP BY dt\n\
                 )"
            )
        };

        format!(
            "WITH {day_list},\n\
             {sub},\n\
             {conv},\n\
             {fst},\n\
             member AS (\n  \
               SELECT DATE(TIMESTAMP_MICROS(event_timestamp), '{tz}') AS dt,\n         \
                      COUNT(DISTINCT user_pseudo_id) AS n\n  \
               FROM {member_events}\n  \
               WHERE event_name = 'page_view'\n    \
                 AND _TABLE_SUFFIX BETWEEN FORMAT_DATE('%Y%m%d', @start_date) AND FORMAT_DATE('%Y%m%d', @end_date)\n    \
                 AND (SELECT ep.value.string_value FROM UNNEST(event_params) AS ep WHERE ep.key = 'page_location') LIKE @member_page_pattern\n  \
               GROUP BY dt\n\
             ),\n\
             site AS (\n  \
               SELECT DATE(TIMESTAMP_MICROS(event_timestamp), '{tz}') AS dt,\n         \
                      COUNT(DISTINCT user_pseudo_id) AS n\n  \
               FROM {site_events}\n  \
               WHERE event_name = 'page_view'\n    \
                 AND _TABLE_SUFFIX BETWEEN FORMAT_DATE('%Y%m%d', @start_date) AND FORMAT_DATE('%Y%m%d', @end_date)\n  \
               GROUP BY dt\n\
             )\n\
             SELECT\n  \
               FORMAT_DATE('%Y-%m-%d', day_list.date) AS date,\n  \
               COALESCE(site.n, 0) AS unique_users_3,\n  \
               COALESCE(member.n, 0) AS unique_users_2,\n  \
               COALESCE(sub.n, 0) AS sub,\n  \
               COALESCE(conv.n, 0) AS conv,\n  \
               COALESCE(fst.n, 0) AS fst\n\
             FROM day_list\n\
             LEFT JOIN site ON day_list.date = site.dt\n\
             LEFT JOIN member ON day_list.date = member.dt\n\
             LEFT JOIN sub ON day_list.date = sub.dt\n\
             LEFT JOIN conv ON day_list.date = conv.dt\n\
             LEFT JOIN fst ON day_list.date = fst.dt\n\
             ORDER BY day_list.date",
            day_list = Self::day_list_cte(),
            sub = user_count("subscription_date", "sub"),
            conv = user_count("conversion_date", "conv"),
            fst = user_count("first_order_date", "fst"),
        )
    }

    fn shop_funnel_sql(&self) -> String {
        let tz = self.config.timezone();
        let line_users = self.config.table(&self.config.line_users_table);
        let actions = self.config.table(&self.config.action_log_table);
        let action_ts = "TIMESTAMP_SECONDS(CAST(JSON_EXTRACT_SCALAR(data, '$.createdAt._seconds') AS INT64))";

        format!(
            "WITH {day_list},\n\
             line_users AS (\n  \
               SELECT DATE(TIMESTAMP(JSON_EXTRACT_SCALAR(data, '$.createdAt')), '{tz}') AS dt,\n         \
                      COUNT(DISTINCT JSON_EXTRACT_SCALAR(data, '$.userUid')) AS n\n  \
               FROM {line_users}\n  \
               WHERE JSON_EXTRACT_SCALAR(data, '$.isBlock') = 'false'\n    \
                 AND JSON_EXTRACT_SCALAR(data, '$.isBlacklist') = 'false'\n    \
                 AND DATE(TIMESTAMP(JSON_EXTRACT_SCALAR(data, '$.createdAt')), '{tz}') BETWEEN @start_date AND @end_date\n  \
               GROUP BY dt\n\
             ),\n\
             actions AS (\n  \
               SELECT DATE({action_ts}, '{tz}') AS dt,\n         \
                      JSON_EXTRACT_SCALAR(data, '$.type') AS action,\n         \
                      JSON_EXTRACT_SCALAR(data, '$.pageMatchedPath') AS path,\n         \
                      JSON_EXTRACT_SCALAR(data, '$.userId') AS user_id,\n         \
                      {action_ts} AS ts\n  \
               FROM {actions}\n  \
               WHERE DATE({action_ts}, '{tz}') BETWEEN @start_date AND @end_date\n\
             ),\n\
             daily_actions AS (\n  \
               SELECT dt,\n         \
                      COUNT(DISTINCT IF(action = 'access' AND path = '/products/:productUid', user_id, NULL)) AS product_users,\n         \
                      COUNT(DISTINCT IF(action = 'cart', user_id, NULL)) AS cart_users,\n         \
                      COUNT(DISTINCT IF(action = 'order', user_id, NULL)) AS order_users\n  \
               FROM actions\n  \
               GROUP BY dt\n\
             ),\n\
             order_seq AS (\n  \
               SELECT dt, user_id, ROW_NUMBER() OVER (PARTITION BY user_id ORDER BY ts) AS order_num\n  \
               FROM actions\n  \
               WHERE action = 'order'\n\
             ),\n\
             daily_repeats AS (\n  \
               SELECT dt,\n         \
                      COUNT(DISTINCT IF(order_num >= 2, user_id, NULL)) AS repeat_2,\n         \
                      COUNT(DISTINCT IF(order_num >= 3, user_id, NULL)) AS repeat_3\n  \
               FROM order_seq\n  \
               GROUP BY dt\n\
             )\n\
             SELECT\n  \
               FORMAT_DATE('%Y-%m-%d', day_list.date) AS date,\n  \
               COALESCE(line_users.n, 0) AS newUsersNum,\n  \
               COALESCE(daily_actions.product_users, 0) AS productUniqueUsers,\n  \
               COALESCE(daily_actions.cart_users, 0) AS cartUniqueUsers,\n  \
               COALESCE(daily_actions.order_users, 0) AS orderUniqueUsers,\n  \
               COALESCE(daily_repeats.repeat_2, 0) AS repeat2Plus,\n  \
               COALESCE(daily_repeats.repeat_3, 0) AS repeat3Plus\n\
             FROM day_list\n\
             LEFT JOIN line_users ON day_list.date = line_users.dt\n\
             LEFT JOIN daily_actions ON day_list.date = daily_actions.dt\n\
             LEFT JOIN daily_repeats ON day_list.date = daily_repeats.dt\n\
             ORDER BY day_list.date",
            day_list = Self::day_list_cte(),
        )
    }

    fn traffic_sql(&self) -> String {
        let tz = self.config.timezone();
        let site_events = self.config.table(&format!("{}.events_*", self.config.site_dataset));

        format!(
            "WITH {day_list},\n\
             sessions AS (\n  \
               SELECT DATE(TIMESTAMP_MICROS(event_timestamp), '{tz}') AS dt,\n         \
                      LOWER(IFNULL(traffic_source.medium, '(none)')) AS medium,\n         \
                      user_pseudo_id\n  \
               FROM {site_events}\n  \
               WHERE event_name = 'session_start'\n    \
                 AND _TABLE_SUFFIX BETWEEN FORMAT_DATE('%Y%m%d', @start_date) AND FORMAT_DATE('%Y%m%d', @end_date)\n\
             ),\n\
             channels AS (\n  \
               SELECT dt,\n         \
                      COUNTIF(medium IN ('cpc', 'ppc', 'paid', 'display', 'paidsearch')) AS ads,\n         \
                      COUNTIF(medium = 'organic') AS seo,\n         \
                      COUNTIF(medium IN ('social', 'sns', 'social-network')) AS sns,\n         \
                      COUNTIF(medium IN ('(none)', '(direct)')) AS direct,\n         \
                      COUNTIF(medium NOT IN ('cpc', 'ppc', 'paid', 'display', 'paidsearch', 'organic', 'social', 'sns', 'social-network', '(none)', '(direct)')) AS other\n  \
               FROM sessions\n  \
               GROUP BY dt\n\
             )\n\
             SELECT\n  \
               FORMAT_DATE('%Y-%m-%d', day_list.date) AS date,\n  \
               COALESCE(channels.ads, 0) AS ads,\n  \
               COALESCE(channels.seo, 0) AS seo,\n  \
               COALESCE(channels.sns, 0) AS sns,\n  \
               COALESCE(channels.direct, 0) AS direct,\n  \
               COALESCE(channels.other, 0) AS other\n\
             FROM day_list\n\
             LEFT JOIN channels ON day_list.date = channels.dt\n\
             ORDER BY day_list.date",
            day_list = Self::day_list_cte(),
        )
    }
}

#[async_trait]
impl SeriesSource for WarehouseSource {
    async fn fetch(&self, dataset: Dataset, range: &DateRange) -> Result<SeriesSet> {
        let query = self.build_query(dataset, range);

        let started = Instant::now();
        let result = self.backend.execute(&query).await?;

        tracing::debug!(
            dataset = dataset.name(),
            start = %range.start,
            end = %range.end,
            rows = result.row_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dataset fetched"
        );

        parse_series_set(dataset, &result)
    }

    async fn health_check(&self) -> Result<()> {
        self.backend.health_check().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.backend.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use growth_warehouse::{Column, DataType, QueryResult, validate_sql};
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingBackend {
        queries: Mutex<Vec<Query>>,
        result: QueryResult,
    }

    #[async_trait]
    impl WarehouseBackend for RecordingBackend {
        async fn execute(&self, query: &Query) -> growth_warehouse::Result<QueryResult> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(self.result.clone())
        }

        async fn health_check(&self) -> growth_warehouse::Result<()> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
    }

    fn source(result: QueryResult) -> (Arc<RecordingBackend>, WarehouseSource) {
        let backend = Arc::new(RecordingBackend {
            queries: Mutex::new(Vec::new()),
            result,
        });
        let source = WarehouseSource::new(backend.clone(), WarehouseSourceConfig::new("proj")).unwrap();
        (backend, source)
    }

    #[test]
    fn test_every_dataset_query_passes_guardrail() {
        let (_, source) = source(QueryResult::empty());
        for dataset in Dataset::ALL {
            let query = source.build_query(dataset, &range());
            validate_sql(&query.sql).unwrap();
            for (column, _) in dataset.columns() {
                assert!(query.sql.contains(&format!("AS {}", column)), "{} missing {}", dataset, column);
            }
        }
    }

    #[test]
    fn test_query_binds_dates() {
        let (_, source) = source(QueryResult::empty());
        let query = source.build_query(Dataset::ShopFunnel, &range());

        assert_eq!(query.param("start_date"), Some(&ParamValue::Date(range().start)));
        assert_eq!(query.param("end_date"), Some(&ParamValue::Date(range().end)));
        assert!(query.sql.contains("`proj.firestore_export_user.users_raw_changelog`"));
        assert!(query.sql.contains("'+09:00'"));
    }

    #[test]
    fn test_site_funnel_binds_member_pattern() {
        let (_, source) = source(QueryResult::empty());
        let query = source.build_query(Dataset::SiteFunnel, &range());
        assert!(query.sql.contains("LIKE @member_page_pattern"));
        assert!(query.param("member_page_pattern").is_some());
    }

    #[test]
    fn test_timezone_formatting() {
        let mut config = WarehouseSourceConfig::new("p");
        assert_eq!(config.timezone(), "+09:00");
        config.utc_offset_hours = -5;
        assert_eq!(config.timezone(), "-05:00");
        config.utc_offset_hours = 0;
        assert_eq!(config.timezone(), "+00:00");
    }

    #[test]
    fn test_rejects_bad_identifiers() {
        let mut config = WarehouseSourceConfig::new("proj");
        config.users_table = "users`; DROP TABLE x".to_string();
        let backend = Arc::new(RecordingBackend {
            queries: Mutex::new(Vec::new()),
            result: QueryResult::empty(),
        });
        assert!(WarehouseSource::new(backend, config).is_err());
    }

    #[tokio::test]
    async fn test_fetch_parses_rows() {
        let columns = std::iter::once(Column::new("date", DataType::String, false))
            .chain(
                Dataset::TrafficSources
                    .columns()
                    .iter()
                    .map(|(name, _)| Column::new(*name, DataType::Int64, false)),
            )
            .collect();
        let result = QueryResult::new(
            columns,
            vec![
                vec![json!("2024-06-01"), json!(5), json!(4), json!(3), json!(2), json!(1)],
                vec![json!("2024-06-02"), json!(1), json!(0), json!(0), json!(0), json!(0)],
            ],
            12,
        );

        let (backend, source) = source(result);
        let set = source.fetch(Dataset::TrafficSources, &range()).await.unwrap();

        assert_eq!(backend.queries.lock().unwrap().len(), 1);
        assert_eq!(set.series.len(), 5);
        assert_eq!(set.get("Ads").unwrap().total(), 6.0);
        assert_eq!(set.get("Other").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_empty_result_is_error() {
        let (_, source) = source(QueryResult::empty());
        let err = source.fetch(Dataset::SiteFunnel, &range()).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::EmptyResult { .. }));
    }
}
