// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cursor-driven pagination.

use serde_json::{Map, Value};
use tracing::{debug, warn, Instrument};

use crate::client::{QueryOptions, Web3Client};
use crate::endpoint::Endpoint;
use crate::errors::QueryError;
use crate::response::ApiResponse;
use crate::tracing::spans;

/// Field carrying the page items when present.
const RESULT_FIELD: &str = "result";
/// Field carrying the continuation token.
const CURSOR_FIELD: &str = "cursor";
/// Query parameter for the page size.
const LIMIT_PARAM: &str = "limit";

/// Shape of a single page.
#[derive(Debug, PartialEq)]
enum Page {
    /// Items plus an optional cursor for the next page
    Items {
        items: Vec<Value>,
        cursor: Option<String>,
    },
    /// A bare array response; there is nothing to follow
    Bare(Vec<Value>),
    /// Anything else ends the walk
    Other,
}

impl Page {
    fn from_response(response: ApiResponse) -> Self {
        match response.into_json() {
            Some(Value::Array(items)) => Page::Bare(items),
            Some(Value::Object(mut fields)) => match take_items(&mut fields) {
                Some(items) => Page::Items {
                    items,
                    cursor: fields
                        .get(CURSOR_FIELD)
                        .and_then(Value::as_str)
                        .filter(|cursor| !cursor.is_empty())
                        .map(str::to_string),
                },
                None => Page::Other,
            },
            _ => Page::Other,
        }
    }
}

/// `result` if it is an array, otherwise the first array-valued field.
fn take_items(fields: &mut Map<String, Value>) -> Option<Vec<Value>> {
    let key = if matches!(fields.get(RESULT_FIELD), Some(Value::Array(_))) {
        RESULT_FIELD.to_string()
    } else {
        fields
            .iter()
            .find(|(_, value)| value.is_array())
            .map(|(key, _)| key.clone())?
    };
    match fields.remove(&key) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

impl Web3Client {
    /// Follow cursors from `endpoint` and collect every item.
    ///
    /// Stops when the cursor runs out, when `max_results` items have been
    /// collected (the result is truncated to exactly that many), or after
    /// [`crate::ClientConfig::max_pages`] pages. Hitting the page cap is
    /// logged, not an error. `None` or `Some(0)` means no result limit.
    ///
    /// An error on the first page is returned. An error on a later page ends
    /// the walk with a warning and the items collected so far are returned.
    ///
    /// A `limit` parameter in `options` overrides the configured page size.
    pub async fn paginate(
        &self,
        endpoint: impl Into<Endpoint>,
        options: QueryOptions,
        max_results: Option<usize>,
    ) -> Result<Vec<Value>, QueryError> {
        let endpoint = endpoint.into();
        let max_results = max_results.filter(|max| *max > 0);
        let span = spans::paginate(endpoint.template(), max_results);
        let current = span.clone();

        async move {
            let mut options = options;
            options
                .params
                .entry(LIMIT_PARAM.to_string())
                .or_insert_with(|| Value::from(self.config().page_size));

            let max_pages = self.config().max_pages;
            let mut collected = Vec::new();
            let mut pages = 0usize;

            loop {
                if pages >= max_pages {
                    warn!(
                        pages,
                        items = collected.len(),
                        "Page cap reached, stopping pagination"
                    );
                    break;
                }

                let response = match self.query(endpoint.clone(), options.clone()).await {
                    Ok(response) => response,
                    Err(error) if pages == 0 => return Err(error),
                    Err(error) => {
                        warn!(
                            error = %error,
                            pages,
                            items = collected.len(),
                            "Page request failed, returning collected items"
                        );
                        break;
                    }
                };
                pages += 1;

                let next = match Page::from_response(response) {
                    Page::Items { items, cursor } => {
                        collected.extend(items);
                        cursor
                    }
                    Page::Bare(items) => {
                        collected.extend(items);
                        None
                    }
                    Page::Other => None,
                };

                if let Some(max) = max_results {
                    if collected.len() >= max {
                        collected.truncate(max);
                        break;
                    }
                }

                match next {
                    Some(cursor) => {
                        debug!(page = pages, items = collected.len(), "Following cursor");
                        options
                            .params
                            .insert(CURSOR_FIELD.to_string(), Value::from(cursor));
                    }
                    None => break,
                }
            }

            current.record("pages", pages);
            Ok(collected)
        }
        .instrument(span)
        .await
    }
}
