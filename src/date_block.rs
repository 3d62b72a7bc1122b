//! Date expressions and date-to-block resolution.
//!
//! Block-ranged endpoints accept `from_date`/`to_date` as a convenience. The
//! expression is turned into a UTC instant at call time and then into a block
//! number by the `dateToBlock` endpoint.
//!
//! Accepted forms:
//!
//! | Form                         | Example                      |
//! |------------------------------|------------------------------|
//! | `N <unit>[s] ago`            | `2 hours ago`, `1 Week ago`  |
//! | RFC 3339                     | `2024-01-01T12:00:00+02:00`  |
//! | `YYYY-MM-DD`                 | `2024-01-01` (midnight UTC)  |
//! | `YYYY-MM-DD HH:MM:SS`        | `2024-01-01 12:30:00` (UTC)  |
//! | `YYYY-MM-DDTHH:MM:SS`        | `2024-01-01T12:30:00` (UTC)  |
//!
//! A month counts as 30 days and a year as 365 days.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{debug, Instrument};

use crate::chain::resolve_chain;
use crate::client::Web3Client;
use crate::errors::{QueryError, ValidationError};
use crate::tracing::spans;

/// Unit of a relative date expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    /// 30 days
    Month,
    /// 365 days
    Year,
}

impl TimeUnit {
    /// Length of one unit in seconds.
    pub fn seconds(self) -> i64 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Minute => 60,
            TimeUnit::Hour => 3_600,
            TimeUnit::Day => 86_400,
            TimeUnit::Week => 604_800,
            TimeUnit::Month => 2_592_000,
            TimeUnit::Year => 31_536_000,
        }
    }

    fn parse(word: &str) -> Option<Self> {
        let singular = word.strip_suffix('s').unwrap_or(word);
        match singular {
            "second" => Some(TimeUnit::Second),
            "minute" => Some(TimeUnit::Minute),
            "hour" => Some(TimeUnit::Hour),
            "day" => Some(TimeUnit::Day),
            "week" => Some(TimeUnit::Week),
            "month" => Some(TimeUnit::Month),
            "year" => Some(TimeUnit::Year),
            _ => None,
        }
    }
}

/// A parsed date expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateExpr {
    /// `amount` units before the moment of resolution
    Ago { amount: u64, unit: TimeUnit },
    /// A fixed instant
    At(DateTime<Utc>),
}

impl DateExpr {
    /// Parse a relative or absolute date expression.
    ///
    /// ```rust
    /// use web3_query::date_block::{DateExpr, TimeUnit};
    ///
    /// assert_eq!(
    ///     DateExpr::parse("2 hours ago").unwrap(),
    ///     DateExpr::Ago { amount: 2, unit: TimeUnit::Hour }
    /// );
    /// assert!(DateExpr::parse("yesterday-ish").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if let Some(expr) = parse_relative(trimmed) {
            return Ok(expr);
        }
        parse_absolute(trimmed)
            .map(DateExpr::At)
            .ok_or_else(|| ValidationError::invalid_date(input))
    }

    /// Resolve against `now`.
    ///
    /// Offsets too large to represent saturate at the earliest representable instant.
    pub fn resolve_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            DateExpr::At(instant) => instant,
            DateExpr::Ago { amount, unit } => i64::try_from(amount)
                .ok()
                .and_then(|amount| amount.checked_mul(unit.seconds()))
                .and_then(TimeDelta::try_seconds)
                .and_then(|offset| now.checked_sub_signed(offset))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }
}

impl FromStr for DateExpr {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_relative(input: &str) -> Option<DateExpr> {
    let lowered = input.to_lowercase();
    let mut words = lowered.split_whitespace();
    let amount = words.next()?.parse::<u64>().ok()?;
    let unit = TimeUnit::parse(words.next()?)?;
    match (words.next(), words.next()) {
        (Some("ago"), None) => Some(DateExpr::Ago { amount, unit }),
        _ => None,
    }
}

fn parse_absolute(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format an instant the way the `dateToBlock` endpoint expects (ISO 8601, ms, `Z`).
pub fn format_api_date(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Web3Client {
    /// Resolve a date expression to the block closest to it on `chain`.
    ///
    /// `chain` may be a name or a hex id. Relative expressions are evaluated
    /// against the current wall-clock time.
    pub async fn date_to_block(&self, date: &str, chain: &str) -> Result<u64, QueryError> {
        let chain = resolve_chain(Some(chain));
        let instant = DateExpr::parse(date)?.resolve_at(Utc::now());
        let formatted = format_api_date(instant);
        let span = spans::date_to_block(chain.as_str(), &formatted);

        async move {
            let mut params = Map::new();
            params.insert("chain".to_string(), Value::from(chain.as_str()));
            params.insert("date".to_string(), Value::from(formatted.as_str()));

            let response = self
                .send(
                    &Method::GET,
                    &self.config().evm_base_url,
                    "/dateToBlock",
                    &params,
                    None,
                )
                .await?;

            let block = response
                .as_json()
                .and_then(|body| body.get("block"))
                .and_then(block_number)
                .ok_or_else(|| {
                    QueryError::unexpected_response(format!(
                        "dateToBlock response has no block number: {response}"
                    ))
                })?;
            debug!(block, "Resolved date to block");
            Ok(block)
        }
        .instrument(span)
        .await
    }
}

fn block_number(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
