use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domains::jobs::upsert::{JobSourceInput, JobUpsertInput};
use crate::domains::notifications::NotificationPayload;

const API_URL: &str = "https://web3.career/api/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches listings from the Web3 Career HTTP API using a single API
/// token.
pub struct Web3CareerFeed {
    client: Client,
    api_token: String,
}

/// One listing as the API returns it. The API reports booleans as 0/1
/// or strings depending on the field, so `is_remote` gets a lenient
/// deserializer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Web3CareerJob {
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub apply_url: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub is_remote: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub date_epoch: Option<i64>,
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().unwrap_or(0) != 0 || n.as_f64().unwrap_or(0.0) != 0.0,
        Value::String(s) => !s.is_empty() && s != "0" && s.to_lowercase() != "false",
        _ => false,
    })
}

impl Web3CareerFeed {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_token: api_token.into(),
        }
    }

    /// Fetch the current listings, newest first as the API orders them.
    /// A failed request fails the whole pass; malformed individual
    /// listings are logged and dropped.
    pub async fn fetch_jobs(&self) -> Result<Vec<Web3CareerJob>> {
        let body: Value = self
            .client
            .get(API_URL)
            .query(&[("token", self.api_token.as_str())])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        listings_from_response(&body)
    }
}

/// The API wraps the listings in a three-element array; element 2 holds
/// the job objects.
fn listings_from_response(body: &Value) -> Result<Vec<Web3CareerJob>> {
    let listings = body
        .get(2)
        .and_then(Value::as_array)
        .context("unexpected response shape from Web3 Career")?;

    let mut jobs = Vec::with_capacity(listings.len());
    for listing in listings {
        match serde_json::from_value::<Web3CareerJob>(listing.clone()) {
            Ok(job) => jobs.push(job),
            Err(e) => warn!("Skipping malformed Web3 Career listing: {:?}", e),
        }
    }
    Ok(jobs)
}

/// Map a listing onto the canonical job shape. The apply URL is the
/// dedup key; the API's numeric id becomes the external id.
pub fn job_to_upsert_input(job: &Web3CareerJob) -> JobUpsertInput {
    let mut metadata = std::collections::BTreeMap::new();
    if let Some(country) = job.country.as_deref().filter(|s| !s.is_empty()) {
        metadata.insert("country".to_string(), country.to_string());
    }
    if let Some(city) = job.city.as_deref().filter(|s| !s.is_empty()) {
        metadata.insert("city".to_string(), city.to_string());
    }
    if let Some(epoch) = job.date_epoch {
        metadata.insert("dateEpoch".to_string(), epoch.to_string());
    }

    let posted_at = job
        .date_epoch
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
        .or_else(|| {
            job.date
                .as_deref()
                .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                .map(|d| d.with_timezone(&Utc))
        });

    JobUpsertInput {
        title: job.title.clone(),
        company: job.company.clone().filter(|s| !s.is_empty()),
        author: None,
        location: job.location.clone().filter(|s| !s.is_empty()),
        url: job.apply_url.clone(),
        posted_at,
        description: job.description.clone().filter(|s| !s.is_empty()),
        is_remote: Some(job.is_remote),
        tags: job.tags.clone(),
        metadata,
        source: JobSourceInput {
            name: "web3career".to_string(),
            external_id: job.id.map(|id| id.to_string()),
            raw_url: Some(job.apply_url.clone()),
            data: serde_json::to_value(job).ok(),
        },
    }
}

pub fn notification_payload(job: &Web3CareerJob) -> NotificationPayload {
    let mut body = job
        .company
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "New role on Web3 Career".to_string());
    if let Some(location) = job.location.as_deref().filter(|s| !s.is_empty()) {
        body.push_str(&format!(" ({})", location));
    } else if job.is_remote {
        body.push_str(" (Remote)");
    }
    NotificationPayload::new(job.title.clone(), body, job.apply_url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_response() -> Value {
        json!([
            {"meta": "ignored"},
            ["also", "ignored"],
            [
                {
                    "id": 4211,
                    "title": "Senior Rust Engineer",
                    "company": "ChainWorks",
                    "location": "Berlin",
                    "apply_url": "https://web3.career/senior-rust-engineer-chainworks/4211",
                    "date": "2023-11-14T12:00:00+00:00",
                    "date_epoch": 1699963200,
                    "description": "<p>Build indexers.</p>",
                    "is_remote": 1,
                    "tags": ["rust", "backend"],
                    "country": "Germany",
                    "city": "Berlin"
                },
                {
                    "id": "not-a-number",
                    "title": 12345
                },
                {
                    "id": 4212,
                    "title": "Solidity Auditor",
                    "apply_url": "https://web3.career/solidity-auditor/4212",
                    "is_remote": "false"
                }
            ]
        ])
    }

    #[test]
    fn extracts_listings_from_third_element() {
        let jobs = listings_from_response(&sample_response()).unwrap();
        // The malformed middle entry is dropped, not fatal.
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Senior Rust Engineer");
        assert!(jobs[0].is_remote);
        assert_eq!(jobs[1].title, "Solidity Auditor");
        assert!(!jobs[1].is_remote);
    }

    #[test]
    fn rejects_unexpected_shapes() {
        assert!(listings_from_response(&json!({"error": "bad token"})).is_err());
        assert!(listings_from_response(&json!([1, 2])).is_err());
    }

    #[test]
    fn truthy_accepts_the_api_variants() {
        for (raw, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!(1), true),
            (json!(0), false),
            (json!("1"), true),
            (json!("0"), false),
            (json!("false"), false),
            (json!("remote"), true),
            (json!(""), false),
            (json!(null), false),
        ] {
            #[derive(Deserialize)]
            struct Probe {
                #[serde(default, deserialize_with = "truthy")]
                flag: bool,
            }
            let probe: Probe = serde_json::from_value(json!({ "flag": raw })).unwrap();
            assert_eq!(probe.flag, expected, "for {:?}", raw);
        }
    }

    #[test]
    fn maps_listing_to_upsert_input() {
        let jobs = listings_from_response(&sample_response()).unwrap();
        let input = job_to_upsert_input(&jobs[0]);

        assert_eq!(input.company.as_deref(), Some("ChainWorks"));
        assert_eq!(input.url, jobs[0].apply_url);
        assert_eq!(input.is_remote, Some(true));
        assert_eq!(input.tags, vec!["rust".to_string(), "backend".to_string()]);
        assert_eq!(input.metadata.get("country").map(String::as_str), Some("Germany"));
        assert_eq!(input.source.name, "web3career");
        assert_eq!(input.source.external_id.as_deref(), Some("4211"));
        assert_eq!(
            input.posted_at.map(|d| d.timestamp()),
            Some(1699963200)
        );
    }

    #[test]
    fn notification_prefers_company_then_remote_hint() {
        let jobs = listings_from_response(&sample_response()).unwrap();

        let with_company = notification_payload(&jobs[0]);
        assert_eq!(with_company.title, "Senior Rust Engineer");
        assert_eq!(with_company.body, "ChainWorks (Berlin)");

        let bare = notification_payload(&jobs[1]);
        assert_eq!(bare.body, "New role on Web3 Career");
    }
}
