// # Event Listing Workflow
//
// Lists open and upcoming events that started within a lookback window,
// page by page, and fetches the details of every event.
//
// ## Region Changes
//
// Every page request and every detail request obtains its client from the
// shared `RegionBoundClientCache`. A region flip in the middle of pagination
// surfaces as `ActiveRegionChanged`, which this workflow propagates untouched
// so the runner restarts the listing from the first page against the new
// region.
//
// ## Wire Format
//
// `GET {endpoint}{events_path}?startTimeFrom=..&eventStatusCodes=..&nextToken=..`
//
// ```json
// { "events": [ { "arn": "...", "service": "EC2", ... } ], "nextToken": "..." }
// ```
//
// `GET {endpoint}{details_path}?eventArn=..`
//
// ```json
// { "successfulSet": [ { "event": { ... }, "eventDescription": { "latestDescription": "..." } } ],
//   "failedSet": [ { "eventArn": "...", "errorName": "...", "errorMessage": "..." } ] }
// ```

use crate::client::RegionalHttpClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regionwatch_core::{Error, RegionBoundClientCache, Result, Workflow};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Default path of the event listing resource
pub const DEFAULT_EVENTS_PATH: &str = "/events";

/// Default path of the event details resource
pub const DEFAULT_DETAILS_PATH: &str = "/event-details";

/// Default lookback window in days
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Summary of one event as returned by the listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    /// Unique event identifier
    pub arn: String,

    #[serde(default)]
    pub service: Option<String>,

    #[serde(default)]
    pub event_type_code: Option<String>,

    #[serde(default)]
    pub status_code: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_updated_time: Option<DateTime<Utc>>,
}

/// One page of the event listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    #[serde(default)]
    pub events: Vec<EventSummary>,

    /// Token of the next page; absent or empty on the last page
    #[serde(default)]
    pub next_token: Option<String>,
}

impl EventPage {
    /// Token to request the following page, if any
    pub fn next_page_token(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|token| !token.is_empty())
    }
}

/// Description attached to an event
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDescription {
    #[serde(default)]
    pub latest_description: Option<String>,
}

/// Details of one event
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub event: EventSummary,

    #[serde(default)]
    pub event_description: EventDescription,
}

/// An event whose details could not be retrieved
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailsFailure {
    pub event_arn: String,

    #[serde(default)]
    pub error_name: Option<String>,

    #[serde(default)]
    pub error_message: Option<String>,
}

/// Response of the event details resource
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailsResponse {
    #[serde(default)]
    pub successful_set: Vec<EventDetails>,

    #[serde(default)]
    pub failed_set: Vec<EventDetailsFailure>,
}

/// Which events to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Only events that started at or after this instant
    pub start_time_from: DateTime<Utc>,

    /// Accepted event status codes
    pub status_codes: Vec<String>,
}

impl EventFilter {
    /// Open or upcoming events that started within the last `days` days
    ///
    /// Fails with `Error::Config` when the window is negative or reaches
    /// outside the representable time range.
    pub fn recent(now: DateTime<Utc>, days: i64) -> Result<Self> {
        let start_time_from = chrono::Duration::try_days(days)
            .filter(|window| *window >= chrono::Duration::zero())
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or_else(|| Error::config(format!("Invalid lookback window: {} days", days)))?;

        Ok(Self {
            start_time_from,
            status_codes: vec!["open".to_string(), "upcoming".to_string()],
        })
    }

    /// Query parameters for one listing request
    pub fn to_query(&self, next_token: Option<&str>) -> Vec<(&'static str, String)> {
        let mut query = vec![("startTimeFrom", self.start_time_from.to_rfc3339())];
        query.extend(
            self.status_codes
                .iter()
                .map(|code| ("eventStatusCodes", code.clone())),
        );
        if let Some(token) = next_token {
            query.push(("nextToken", token.to_string()));
        }
        query
    }
}

/// Workflow listing recent events and their details
pub struct EventListingWorkflow {
    /// Shared region-bound client cache
    cache: Arc<RegionBoundClientCache<RegionalHttpClient>>,

    events_path: String,
    details_path: String,
    lookback_days: i64,

    /// Events matched by the last completed execution
    matched_events: usize,
}

impl EventListingWorkflow {
    /// Create a workflow with default paths and a 7 day lookback
    pub fn new(cache: Arc<RegionBoundClientCache<RegionalHttpClient>>) -> Self {
        Self {
            cache,
            events_path: DEFAULT_EVENTS_PATH.to_string(),
            details_path: DEFAULT_DETAILS_PATH.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            matched_events: 0,
        }
    }

    /// Set the resource paths
    pub fn with_paths(
        mut self,
        events_path: impl Into<String>,
        details_path: impl Into<String>,
    ) -> Self {
        self.events_path = events_path.into();
        self.details_path = details_path.into();
        self
    }

    /// Set the lookback window
    pub fn with_lookback_days(mut self, lookback_days: i64) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    /// Number of events matched by the last completed execution
    pub fn matched_events(&self) -> usize {
        self.matched_events
    }

    /// Fetch and log the details of one event
    async fn log_event_details(&self, event: &EventSummary) -> Result<()> {
        // One ARN per request. The details resource accepts batches, but then
        // a partially failed batch needs per-ARN handling.
        let client = self.cache.get_client().await?;
        let details: EventDetailsResponse = client
            .get_json(&self.details_path, &[("eventArn", event.arn.clone())])
            .await?;

        for detail in &details.successful_set {
            info!(
                region = %client.region(),
                arn = %detail.event.arn,
                service = detail.event.service.as_deref().unwrap_or("-"),
                event_type = detail.event.event_type_code.as_deref().unwrap_or("-"),
                status = detail.event.status_code.as_deref().unwrap_or("-"),
                description = detail
                    .event_description
                    .latest_description
                    .as_deref()
                    .unwrap_or(""),
                "Event details"
            );
        }

        for failure in &details.failed_set {
            warn!(
                arn = %failure.event_arn,
                error = failure.error_name.as_deref().unwrap_or("unknown"),
                message = failure.error_message.as_deref().unwrap_or(""),
                "Failed to retrieve event details"
            );
        }

        Ok(())
    }
}

#[async_trait]
impl Workflow for EventListingWorkflow {
    async fn execute(&mut self) -> Result<()> {
        let filter = EventFilter::recent(Utc::now(), self.lookback_days)?;
        let mut next_token: Option<String> = None;
        let mut matched = 0;

        loop {
            let client = self.cache.get_client().await?;
            let page: EventPage = client
                .get_json(&self.events_path, &filter.to_query(next_token.as_deref()))
                .await?;

            for event in &page.events {
                matched += 1;
                self.log_event_details(event).await?;
            }

            match page.next_page_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        if matched == 0 {
            info!("There are no events that match the given filters");
        }
        self.matched_events = matched;

        Ok(())
    }

    fn name(&self) -> &str {
        "describe-events"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn recent_filter_covers_lookback_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap();
        let filter = EventFilter::recent(now, 7).unwrap();

        assert_eq!(
            filter.start_time_from,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(filter.status_codes, vec!["open", "upcoming"]);
    }

    #[test]
    fn out_of_range_lookback_is_a_config_error() {
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap();

        for days in [1_000_000_000_000, i64::MAX, -1] {
            let err = EventFilter::recent(now, days).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "days={}: {}", days, err);
        }
    }

    #[test]
    fn query_includes_token_only_when_paginating() {
        let now = Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap();
        let filter = EventFilter::recent(now, 1).unwrap();

        let first = filter.to_query(None);
        assert_eq!(first.len(), 3);
        assert!(first.iter().all(|(key, _)| *key != "nextToken"));

        let next = filter.to_query(Some("page-2"));
        assert_eq!(next.last(), Some(&("nextToken", "page-2".to_string())));
    }

    #[test]
    fn decodes_event_page() {
        let page: EventPage = serde_json::from_value(serde_json::json!({
            "events": [{
                "arn": "evt-1",
                "service": "EC2",
                "eventTypeCode": "AWS_EC2_OPERATIONAL_ISSUE",
                "statusCode": "open",
                "startTime": "2024-03-07T10:00:00Z"
            }],
            "nextToken": "abc"
        }))
        .unwrap();

        assert_eq!(page.events.len(), 1);
        assert_eq!(page.events[0].service.as_deref(), Some("EC2"));
        assert_eq!(page.next_page_token(), Some("abc"));
    }

    #[test]
    fn empty_token_ends_pagination() {
        let page: EventPage =
            serde_json::from_value(serde_json::json!({ "events": [], "nextToken": "" })).unwrap();
        assert_eq!(page.next_page_token(), None);

        let page: EventPage = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(page.next_page_token(), None);
    }

    #[test]
    fn decodes_details_response() {
        let details: EventDetailsResponse = serde_json::from_value(serde_json::json!({
            "successfulSet": [{
                "event": { "arn": "evt-1" },
                "eventDescription": { "latestDescription": "Increased error rates" }
            }],
            "failedSet": [{ "eventArn": "evt-2", "errorName": "NotFound" }]
        }))
        .unwrap();

        assert_eq!(
            details.successful_set[0]
                .event_description
                .latest_description
                .as_deref(),
            Some("Increased error rates")
        );
        assert_eq!(details.failed_set[0].event_arn, "evt-2");
    }
}
