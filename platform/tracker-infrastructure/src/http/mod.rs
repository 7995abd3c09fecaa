use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::fmt;
use std::time::{Duration, Instant};

/// Transport settings shared by every outbound HTTP adapter.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_ms: u64,
    pub retries: u32,
    pub user_agent: String,
}

pub fn build_client(settings: &HttpSettings) -> Result<Client, String> {
    Client::builder()
        .timeout(Duration::from_millis(settings.timeout_ms))
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(settings.user_agent.clone())
        .cookie_store(true)
        .build()
        .map_err(|err| format!("failed to build http client: {err}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: Option<u16>,
    pub message: String,
}

impl HttpError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401) | Some(403))
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<HttpError> for String {
    fn from(err: HttpError) -> Self {
        err.message
    }
}

/// GETs `url` and returns the body of a 200 response.
///
/// Server errors and transport failures are retried up to `retries` extra times;
/// any other non-200 status fails immediately.
pub fn get_text(
    client: &Client,
    endpoint: &'static str,
    url: &str,
    retries: u32,
) -> Result<String, HttpError> {
    let span = tracing::debug_span!("infra.http.get", endpoint, url = %url, retries);
    let _enter = span.enter();

    let start = Instant::now();
    let mut attempts = 0u32;
    let mut last_status: Option<u16> = None;
    let mut last_error: Option<String> = None;

    while attempts <= retries {
        attempts += 1;
        if attempts > 1 {
            metrics::counter!("tracker.infra.http.retries_total", "endpoint" => endpoint)
                .increment(1);
            tracing::debug!(attempt = attempts, "retrying request");
        }
        metrics::counter!("tracker.infra.http.requests_total", "endpoint" => endpoint)
            .increment(1);

        match client.get(url).send() {
            Ok(resp) => {
                let status = resp.status();
                last_status = Some(status.as_u16());
                if status == StatusCode::OK {
                    match resp.text() {
                        Ok(body) => {
                            metrics::histogram!(
                                "tracker.infra.http.call_ms",
                                "endpoint" => endpoint,
                                "result" => "ok"
                            )
                            .record(start.elapsed().as_millis() as f64);
                            return Ok(body);
                        }
                        Err(err) => {
                            last_error = Some(format!("{endpoint} body read failed: {err}"));
                            if attempts <= retries {
                                continue;
                            }
                            break;
                        }
                    }
                }
                last_error = Some(format!(
                    "{endpoint} http error: status {}",
                    status.as_u16()
                ));
                if status.is_server_error() && attempts <= retries {
                    continue;
                }
                break;
            }
            Err(err) => {
                last_error = Some(format!("{endpoint} request failed: {err}"));
                if attempts <= retries {
                    continue;
                }
                break;
            }
        }
    }

    let status_label = last_status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string());
    metrics::counter!(
        "tracker.infra.http.errors_total",
        "endpoint" => endpoint,
        "status" => status_label
    )
    .increment(1);
    metrics::histogram!(
        "tracker.infra.http.call_ms",
        "endpoint" => endpoint,
        "result" => "err"
    )
    .record(start.elapsed().as_millis() as f64);

    let message = last_error.unwrap_or_else(|| format!("{endpoint} request failed after retries"));
    tracing::warn!(attempts, status = ?last_status, error = %message, "http request failed");
    Err(HttpError {
        status: last_status,
        message,
    })
}
