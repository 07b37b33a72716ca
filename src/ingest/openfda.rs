/// openFDA Drug Enforcement API Client
///
/// Retrieves drug recall (enforcement) reports from the openFDA API for
/// severity classification and trend analysis.
///
/// API Documentation: https://open.fda.gov/apis/drug/enforcement/
/// Endpoint: https://api.fda.gov/drug/enforcement.json

use serde::Deserialize;

use crate::config::FetchConfig;
use crate::model::FetchError;

/// Maximum records per request enforced by openFDA.
pub const PAGE_LIMIT: u32 = 1_000;

/// openFDA rejects `skip` beyond 25000, which bounds how deep pagination
/// can reach: PAGE_LIMIT + max skip.
pub const MAX_RECORDS: u32 = 26_000;

// ============================================================================
// openFDA API Response Structures
// ============================================================================

/// Top-level enforcement response from openFDA.
#[derive(Debug, Deserialize)]
pub struct EnforcementResponse {
    pub results: Vec<RawRecord>,
}

/// A single drug-enforcement (recall) report as returned by the API.
///
/// Every field is optional at this stage: openFDA records are heterogeneous
/// and the normalizer decides what is required, what is imputed, and what
/// gets a neutral default.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawRecord {
    pub recall_number: Option<String>,
    /// Compact date string, e.g. "20240215". Older records occasionally
    /// use the dashed form.
    pub report_date: Option<String>,
    /// "Class I" / "Class II" / "Class III".
    pub classification: Option<String>,
    #[serde(rename = "reason_for_recall")]
    pub reason: Option<String>,
    /// Free text, e.g. "5,400 bottles".
    pub product_quantity: Option<String>,
    pub product_type: Option<String>,
    pub product_description: Option<String>,
    pub recalling_firm: Option<String>,
    pub status: Option<String>,
}

// ============================================================================
// Query Construction
// ============================================================================

/// A validated date-range query against the enforcement endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EnforcementQuery {
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    /// Records requested for this page; at most `PAGE_LIMIT`.
    pub limit: u32,
    /// Pagination offset.
    pub skip: u32,
}

impl EnforcementQuery {
    /// Builds a first-page query, validating the fetch contract:
    /// `start_date <= end_date` and a positive limit. The limit is capped
    /// at `PAGE_LIMIT`; callers wanting more records paginate via `skip`.
    pub fn new(
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
        limit: u32,
    ) -> Result<EnforcementQuery, FetchError> {
        if start_date > end_date {
            return Err(FetchError::InvalidQuery(format!(
                "start_date {} is after end_date {}",
                start_date, end_date
            )));
        }
        if limit == 0 {
            return Err(FetchError::InvalidQuery("limit must be positive".to_string()));
        }
        Ok(EnforcementQuery {
            start_date,
            end_date,
            limit: limit.min(PAGE_LIMIT),
            skip: 0,
        })
    }

    /// The same query shifted to a later page.
    pub fn page(&self, skip: u32, limit: u32) -> EnforcementQuery {
        EnforcementQuery {
            skip,
            limit: limit.min(PAGE_LIMIT),
            ..self.clone()
        }
    }
}

/// Builds the request URL for an enforcement query.
///
/// openFDA's query DSL expresses date ranges as
/// `search=report_date:[YYYY-MM-DD+TO+YYYY-MM-DD]`; the `+` stands in for
/// the space the DSL expects, so the URL needs no further encoding.
pub fn build_enforcement_url(
    base_url: &str,
    query: &EnforcementQuery,
    api_key: Option<&str>,
) -> String {
    let mut url = format!(
        "{}?search=report_date:[{}+TO+{}]&limit={}&skip={}",
        base_url,
        query.start_date.format("%Y-%m-%d"),
        query.end_date.format("%Y-%m-%d"),
        query.limit,
        query.skip
    );
    if let Some(key) = api_key {
        url.push_str("&api_key=");
        url.push_str(key);
    }
    url
}

// ============================================================================
// Fetch & Parse
// ============================================================================

/// Fetches one page of enforcement reports.
///
/// Status mapping:
/// - 404: openFDA answers NOT_FOUND when a search matches nothing — an
///   empty page, not an error.
/// - 429: `RateLimited` (transient, retried by the caller).
/// - other non-2xx: `HttpError` (5xx transient, 4xx not).
/// - undecodable body: `MalformedResponse` (never retried).
pub fn fetch_page(
    client: &reqwest::blocking::Client,
    config: &FetchConfig,
    query: &EnforcementQuery,
) -> Result<Vec<RawRecord>, FetchError> {
    let url = build_enforcement_url(&config.base_url, query, config.api_key.as_deref());

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| FetchError::Network(e.to_string()))?;

    let status = response.status().as_u16();
    match status {
        404 => return Ok(Vec::new()),
        429 => return Err(FetchError::RateLimited),
        s if !(200..300).contains(&s) => return Err(FetchError::HttpError(s)),
        _ => {}
    }

    let body = response
        .text()
        .map_err(|e| FetchError::Network(e.to_string()))?;
    parse_enforcement_body(&body)
}

/// Parses an enforcement response body. Shared by the live fetch path and
/// the bundled fallback dataset so both produce identical `RawRecord`s.
pub fn parse_enforcement_body(body: &str) -> Result<Vec<RawRecord>, FetchError> {
    let parsed: EnforcementResponse =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedResponse(e.to_string()))?;
    Ok(parsed.results)
}

// ============================================================================
// Tests
// ============================================================================
