use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

use crate::config::UpstreamConfig;
use crate::domain::slots::{format_date, parse_date, parse_datetime, plus_one_month};
use crate::domain::{Category, Provider, SlotIndex};
use crate::envelope::{self, classify_http_error};
use crate::error::CallError;
use crate::http_client::{url_with_query, HttpClient, HttpRequest};
use crate::throttling::UpstreamGate;

const CATEGORIES_ROUTE: &str = "/mobile/ajax/newrecord/company_services";
const DATES_ROUTE: &str = "/ajax/newrecord/get_dates_true";
const DAY_TIMES_ROUTE: &str = "/mobile/ajax/newrecord/get_datetimes";

/// Category and time-slot retrieval against the booking platform.
///
/// Upstream envelope errors fail loud as [`CallError::Api`]; only genuinely
/// absent optional sub-structures (an empty category list, a day without a
/// roster, a single unparseable timestamp) downgrade to empty-or-skip.
#[derive(Clone)]
pub struct BookingClient {
    http: Arc<dyn HttpClient>,
    gate: UpstreamGate,
    base_url: String,
}

impl BookingClient {
    pub fn new(http: Arc<dyn HttpClient>, gate: UpstreamGate, config: &UpstreamConfig) -> Self {
        Self {
            http,
            gate,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Fetches every service category for a company. The upstream keys its
    /// category list by opaque string IDs; the keys are discarded and the
    /// values returned in the mapping's insertion order.
    pub async fn categories(&self, company_id: u64) -> Result<Vec<Category>, CallError> {
        let root = self
            .execute_get(
                CATEGORIES_ROUTE,
                &[("company", company_id.to_string())],
            )
            .await?;
        let payload = envelope::payload(&root)?;

        let Some(Value::Object(list)) = payload.get("list") else {
            warn!(company_id, "category list is missing");
            return Ok(Vec::new());
        };
        if list.is_empty() {
            warn!(company_id, "category list is empty");
            return Ok(Vec::new());
        }

        let categories = list
            .values()
            .map(envelope::decode::<Category>)
            .collect::<Result<Vec<_>, _>>()?;
        info!(company_id, count = categories.len(), "found categories");
        Ok(categories)
    }

    /// Aggregates every bookable slot for a service over the next calendar
    /// month: one date-discovery call, then one call per date that has any
    /// availability, merged into a single chronological index.
    pub async fn slots(&self, company_id: u64, service_id: u64) -> Result<SlotIndex, CallError> {
        let today = OffsetDateTime::now_utc().date();
        let dates = self
            .dates_with_slots(company_id, service_id, today, plus_one_month(today))
            .await?;

        let mut index = SlotIndex::new();
        for date in dates {
            index.merge(self.slots_by_day(company_id, service_id, date).await?);
        }

        info!(
            company_id,
            service_id,
            count = index.len(),
            "found time slots"
        );
        Ok(index)
    }

    async fn dates_with_slots(
        &self,
        company_id: u64,
        service_id: u64,
        from: Date,
        to: Date,
    ) -> Result<Vec<Date>, CallError> {
        let root = self
            .execute_get(
                DATES_ROUTE,
                &[
                    ("company_id", company_id.to_string()),
                    ("services_id[]", service_id.to_string()),
                    ("date_from", format_date(from)),
                    ("date_to", format_date(to)),
                ],
            )
            .await?;
        let payload = envelope::payload(&root)?;

        let Some(Value::Array(raw_dates)) = payload.get("dates_true") else {
            warn!(company_id, service_id, "dates_true is missing");
            return Ok(Vec::new());
        };

        let dates = raw_dates
            .iter()
            .map(|value| {
                let raw = value
                    .as_str()
                    .ok_or_else(|| CallError::data_parse(format!("date is not a string: {value}")))?;
                parse_date(raw)
                    .map_err(|e| CallError::data_parse(format!("invalid date '{raw}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(company_id, service_id, count = dates.len(), "found dates");
        Ok(dates)
    }

    async fn slots_by_day(
        &self,
        company_id: u64,
        service_id: u64,
        date: Date,
    ) -> Result<SlotIndex, CallError> {
        let root = self
            .execute_get(
                DAY_TIMES_ROUTE,
                &[
                    ("company_id", company_id.to_string()),
                    ("service_id[]", service_id.to_string()),
                    ("date", format_date(date)),
                ],
            )
            .await?;
        let payload = envelope::payload(&root)?;

        let (Some(Value::Object(roster_node)), Some(Value::Object(times_node))) =
            (payload.get("masters"), payload.get("times"))
        else {
            warn!(company_id, service_id, %date, "masters or times missing");
            return Ok(SlotIndex::new());
        };

        let mut roster: HashMap<&str, Provider> = HashMap::with_capacity(roster_node.len());
        for (provider_id, value) in roster_node {
            roster.insert(provider_id.as_str(), envelope::decode(value)?);
        }

        let mut index = SlotIndex::new();
        for (provider_id, value) in times_node {
            let times: Vec<String> = envelope::decode(value)?;
            for raw in &times {
                match parse_datetime(raw) {
                    // A provider absent from the roster still claims the slot;
                    // that is a data-quality issue, not a protocol violation.
                    Ok(at) => index.insert(at, roster.get(provider_id.as_str()).cloned()),
                    Err(_) => warn!(%raw, "unparseable slot datetime"),
                }
            }
        }

        Ok(index)
    }

    async fn execute_get(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, CallError> {
        self.gate
            .admit(async {
                let url = url_with_query(&self.base_url, path, params);
                let response = self.http.execute(HttpRequest::get(url)).await?;
                if !response.is_success() {
                    warn!(status = response.status, path, "upstream HTTP error");
                    return Err(classify_http_error(response.status, &response.body));
                }
                envelope::parse_body(&response.body)
            })
            .await
    }
}
