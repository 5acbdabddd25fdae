//! REST Gateway
//!
//! Talks to the hosted backend's PostgREST endpoint
//! (`{base}/rest/v1/{table}`) with `column=eq.value` filters.

use async_trait::async_trait;
use parking_lot::RwLock;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use super::{BatchOutcome, Deleted, Direction, Filter, Gateway, GatewayError, GatewayResult, OrderBy, Row, Table};
use crate::config::AppConfig;

/// Characters left as-is in query values (RFC 3986 unreserved)
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

fn encode_value(value: &Value) -> String {
    match value {
        Value::Null => "is.null".to_string(),
        Value::String(s) => format!("eq.{}", utf8_percent_encode(s, QUERY_VALUE)),
        other => format!("eq.{}", utf8_percent_encode(&other.to_string(), QUERY_VALUE)),
    }
}

/// Build the query string for a filtered, optionally sorted request
pub fn encode_query(filter: &Filter, order_by: Option<&OrderBy>) -> String {
    let mut parts = vec!["select=*".to_string()];
    for (column, value) in filter.iter() {
        parts.push(format!("{}={}", utf8_percent_encode(column, QUERY_VALUE), encode_value(value)));
    }
    if let Some(order) = order_by {
        let direction = match order.direction {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        };
        parts.push(format!("order={}.{}", utf8_percent_encode(&order.column, QUERY_VALUE), direction));
    }
    parts.join("&")
}

/// Gateway backed by the hosted PostgREST API
pub struct RestGateway {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: RwLock<Option<String>>,
}

impl RestGateway {
    pub fn new(config: &AppConfig) -> GatewayResult<Self> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.request_timeout);
        let client = builder.build().map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: RwLock::new(None),
        })
    }

    fn url(&self, table: Table, query: &str) -> String {
        format!("{}/rest/v1/{}?{}", self.base_url, table.as_str(), query)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let bearer = self.access_token.read().clone().unwrap_or_else(|| self.anon_key.clone());
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
            .header("Prefer", "return=representation")
    }

    async fn send_rows(&self, builder: RequestBuilder) -> GatewayResult<Vec<Row>> {
        let response = builder.send().await.map_err(|e| GatewayError::Network(e.to_string()))?;
        let response = check(response).await?;
        response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    fn scoped_to_row(table: Table, id: &str, scope: &Filter) -> Filter {
        scope.iter().fold(Filter::new().eq(table.id_column(), id), |f, (column, value)| {
            f.eq(column, value.clone())
        })
    }
}

async fn check(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(GatewayError::Unauthorized);
    }
    let message = response.text().await.unwrap_or_default();
    Err(GatewayError::Status { status: status.as_u16(), message })
}

#[async_trait(?Send)]
impl Gateway for RestGateway {
    async fn query(&self, table: Table, filter: &Filter, order_by: Option<&OrderBy>) -> GatewayResult<Vec<Row>> {
        let url = self.url(table, &encode_query(filter, order_by));
        self.send_rows(self.request(Method::GET, url)).await
    }

    async fn insert(&self, table: Table, record: Row) -> GatewayResult<Row> {
        let url = format!("{}/rest/v1/{}", self.base_url, table.as_str());
        let rows = self
            .send_rows(self.request(Method::POST, url).json(&vec![Value::Object(record)]))
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::Decode("insert returned no rows".to_string()))
    }

    async fn update(&self, table: Table, id: &str, patch: Row, scope: &Filter) -> GatewayResult<Option<Row>> {
        let filter = Self::scoped_to_row(table, id, scope);
        let url = self.url(table, &encode_query(&filter, None));
        let rows = self
            .send_rows(self.request(Method::PATCH, url).json(&Value::Object(patch)))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn batch_update(&self, table: Table, updates: Vec<(String, Row)>, scope: &Filter) -> GatewayResult<BatchOutcome> {
        // PostgREST has no multi-row patch with per-row values; rows are
        // written one by one and the caller treats any gap as a failure.
        let mut applied = Vec::new();
        let mut failed = Vec::new();
        let mut first_error = None;
        for (id, patch) in updates {
            match self.update(table, &id, patch, scope).await {
                Ok(Some(_)) => applied.push(id),
                Ok(None) => failed.push(id),
                Err(e) => {
                    log::warn!("[GATEWAY] batch row {} failed: {}", id, e);
                    first_error.get_or_insert(e);
                    failed.push(id);
                }
            }
        }

        match (applied.is_empty(), first_error) {
            (_, None) if failed.is_empty() => Ok(BatchOutcome::Applied),
            (true, Some(error)) => Err(error),
            _ => Ok(BatchOutcome::Partial { applied, failed }),
        }
    }

    async fn delete(&self, table: Table, id: &str, scope: &Filter) -> GatewayResult<Deleted> {
        let filter = Self::scoped_to_row(table, id, scope);
        let url = self.url(table, &encode_query(&filter, None));
        let rows = self.send_rows(self.request(Method::DELETE, url)).await?;
        Ok(if rows.is_empty() { Deleted::NotFound } else { Deleted::Removed })
    }

    fn authorize(&self, access_token: Option<String>) {
        *self.access_token.write() = access_token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_query_filters_and_order() {
        let filter = Filter::new().eq("user_id", "u 1").eq("child_id", "c1");
        let query = encode_query(&filter, Some(&OrderBy::asc("order")));
        assert_eq!(query, "select=*&user_id=eq.u%201&child_id=eq.c1&order=order.asc");
    }

    #[test]
    fn test_encode_query_non_string_values() {
        let filter = Filter::new().eq("is_completed", true).eq("routine_id", Value::Null);
        let query = encode_query(&filter, Some(&OrderBy::desc("entry_date")));
        assert_eq!(query, "select=*&is_completed=eq.true&routine_id=is.null&order=entry_date.desc");
    }

    #[test]
    fn test_scoped_to_row_puts_id_first() {
        let scope = Filter::new().eq("user_id", "u1");
        let filter = RestGateway::scoped_to_row(Table::Children, "c9", &scope);
        let pairs: Vec<_> = filter.iter().map(|(c, v)| (c.to_string(), v.clone())).collect();
        assert_eq!(pairs, vec![("child_id".to_string(), json!("c9")), ("user_id".to_string(), json!("u1"))]);
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = AppConfig::from_values("https://db.example.com/", "anon").unwrap();
        let gateway = RestGateway::new(&config).unwrap();
        assert_eq!(
            gateway.url(Table::RoutineTasks, "select=*"),
            "https://db.example.com/rest/v1/routine_tasks?select=*"
        );
    }
}
