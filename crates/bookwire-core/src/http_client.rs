use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::config::UpstreamConfig;

/// HTTP method set needed by the upstream call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One outbound request. Query parameters are already encoded into the URL;
/// form bodies are already urlencoded strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Attaches an urlencoded form body and the matching content type.
    pub fn with_form(self, fields: &[(&str, &str)]) -> Self {
        let mut request =
            self.with_header("content-type", "application/x-www-form-urlencoded");
        request.body = Some(encode_form(fields));
        request
    }

    /// Replays a previously captured cookie fragment on this request.
    pub fn with_cookie(self, cookie: impl Into<String>) -> Self {
        self.with_header("cookie", cookie.into())
    }
}

/// Raw response handed back by the transport. Error statuses are ordinary
/// responses here; the upstream embeds structured error info in error bodies,
/// so callers classify after inspecting both status and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Response headers in arrival order; names lowercased. Repeated headers
    /// (notably `set-cookie`) keep every occurrence.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// All `Set-Cookie` header values, in arrival order.
    pub fn set_cookies(&self) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(name, _)| name == "set-cookie")
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Reduces this response's `Set-Cookie` headers to a `name=value` replay
    /// string, joining the first `;`-segment of each header with `"; "`.
    pub fn cookie_fragment(&self) -> Option<String> {
        let pairs = self
            .set_cookies()
            .into_iter()
            .filter_map(|header| header.split(';').next())
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .collect::<Vec<_>>();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

/// Transport-level failure: connect, DNS, timeout, body read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport contract shared by every upstream call site.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Production transport backed by reqwest, with the fixed connect/read
/// timeouts from [`UpstreamConfig`] applied once at construction.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(concat!("bookwire/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::new(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
            };

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::new(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_ascii_lowercase(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}

/// Joins a base URL, a fixed relative route and pre-stringified query
/// parameters into one encoded URL.
pub fn url_with_query(base_url: &str, path: &str, params: &[(&str, String)]) -> String {
    let mut url = format!("{}{}", base_url.trim_end_matches('/'), path);
    for (index, (name, value)) in params.iter().enumerate() {
        url.push(if index == 0 { '?' } else { '&' });
        url.push_str(&urlencoding::encode(name));
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}

/// Urlencodes form fields into an `application/x-www-form-urlencoded` body.
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(name, value)| format!("{}={}", urlencoding::encode(name), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_with_query_encodes_names_and_values() {
        let url = url_with_query(
            "https://booking.example.test/",
            "/ajax/newrecord/get_dates_true",
            &[
                ("company_id", String::from("42")),
                ("services_id[]", String::from("7")),
                ("date_from", String::from("2024-01-01")),
            ],
        );

        assert_eq!(
            url,
            "https://booking.example.test/ajax/newrecord/get_dates_true\
             ?company_id=42&services_id%5B%5D=7&date_from=2024-01-01"
        );
    }

    #[test]
    fn form_body_sets_content_type_and_encodes_fields() {
        let request = HttpRequest::post("https://booking.example.test/ajax/user/auth/")
            .with_form(&[("number", "+7 900 1"), ("password", "p&ss")]);

        assert_eq!(
            request.headers.get("content-type").map(String::as_str),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(
            request.body.as_deref(),
            Some("number=%2B7%20900%201&password=p%26ss")
        );
    }

    #[test]
    fn replayed_cookie_lands_in_the_cookie_header() {
        let request = HttpRequest::post("https://booking.example.test/x")
            .with_cookie("token=tok1; session=abc");

        assert_eq!(
            request.headers.get("cookie").map(String::as_str),
            Some("token=tok1; session=abc")
        );
    }

    #[test]
    fn cookie_fragment_joins_first_segments() {
        let response = HttpResponse::ok_json("{}")
            .with_header("set-cookie", "token=tok1; Max-Age=3600; Path=/")
            .with_header("set-cookie", "session=abc; HttpOnly");

        assert_eq!(
            response.cookie_fragment().as_deref(),
            Some("token=tok1; session=abc")
        );
    }

    #[test]
    fn cookie_fragment_is_none_without_set_cookie_headers() {
        let response = HttpResponse::ok_json("{}").with_header("content-type", "application/json");
        assert_eq!(response.cookie_fragment(), None);
    }

    #[test]
    fn set_cookies_preserves_repeated_headers_in_order() {
        let response = HttpResponse::ok_json("{}")
            .with_header("set-cookie", "a=1")
            .with_header("content-type", "application/json")
            .with_header("set-cookie", "b=2");

        assert_eq!(response.set_cookies(), vec!["a=1", "b=2"]);
    }
}
