use std::sync::Arc;

use serde_json::Value;
use time::{Duration, OffsetDateTime};
use tracing::warn;

use crate::config::UpstreamConfig;
use crate::domain::AuthSession;
use crate::envelope::{self, classify_http_error};
use crate::error::CallError;
use crate::http_client::{HttpClient, HttpRequest};
use crate::throttling::UpstreamGate;

const AUTH_ROUTE: &str = "/ajax/user/auth/";

/// The upstream signals a completed login with a JavaScript-callback-shaped
/// string embedded in the JSON body, not a status code or boolean.
const CALLBACK_PREFIX: &str = "sw.auth.complete('";
const CALLBACK_SUFFIX: &str = "')";

const TOKEN_COOKIE: &str = "token";

/// Session lifetime when the token cookie carries no usable `Max-Age`.
const DEFAULT_SESSION_TTL_SECS: i64 = 86_400 * 30;

/// Stateless single-shot authentication against the booking platform.
#[derive(Clone)]
pub struct AuthClient {
    http: Arc<dyn HttpClient>,
    gate: UpstreamGate,
    base_url: String,
}

impl AuthClient {
    pub fn new(http: Arc<dyn HttpClient>, gate: UpstreamGate, config: &UpstreamConfig) -> Self {
        Self {
            http,
            gate,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub async fn authenticate(
        &self,
        number: &str,
        password: &str,
    ) -> Result<AuthSession, CallError> {
        self.gate.admit(self.perform(number, password)).await
    }

    async fn perform(&self, number: &str, password: &str) -> Result<AuthSession, CallError> {
        let request = HttpRequest::post(format!("{}{}", self.base_url, AUTH_ROUTE))
            .with_form(&[("number", number), ("password", password)]);
        let response = self.http.execute(request).await?;

        if !response.is_success() {
            warn!(status = response.status, "authentication rejected upstream");
            return Err(classify_http_error(response.status, &response.body));
        }

        let root = envelope::parse_body(&response.body)?;
        let callback = root
            .get("callback")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let session_id = session_id_from_callback(callback)
            .ok_or_else(|| CallError::unknown(format!("unexpected auth response: {callback}")))?;

        let cookies = response.set_cookies();
        let token_header = find_cookie(&cookies, TOKEN_COOKIE)
            .ok_or_else(|| CallError::empty_response("no token cookie in auth response"))?;
        let token = cookie_value(token_header)
            .ok_or_else(|| CallError::empty_response("no token cookie in auth response"))?;

        let ttl = cookie_max_age(token_header).unwrap_or(DEFAULT_SESSION_TTL_SECS);
        Ok(AuthSession {
            session_id: session_id.to_owned(),
            token: token.to_owned(),
            expires_at: OffsetDateTime::now_utc() + Duration::seconds(ttl),
        })
    }
}

/// Extracts the session identifier from the upstream's callback marker.
/// Fails explicitly on any format mismatch; the surrounding call maps that
/// to an `UNKNOWN` failure.
fn session_id_from_callback(callback: &str) -> Option<&str> {
    callback
        .strip_prefix(CALLBACK_PREFIX)?
        .strip_suffix(CALLBACK_SUFFIX)
}

/// Finds the `Set-Cookie` header whose cookie name matches `name`.
fn find_cookie<'a>(headers: &[&'a str], name: &str) -> Option<&'a str> {
    headers.iter().copied().find(|header| {
        header
            .split(';')
            .next()
            .and_then(|pair| pair.split_once('='))
            .is_some_and(|(cookie_name, _)| cookie_name.trim() == name)
    })
}

/// Value of a `Set-Cookie` header's own `name=value` pair.
fn cookie_value(header: &str) -> Option<&str> {
    header
        .split(';')
        .next()?
        .split_once('=')
        .map(|(_, value)| value.trim())
}

/// `Max-Age` attribute of a `Set-Cookie` header, when present and numeric.
fn cookie_max_age(header: &str) -> Option<i64> {
    header.split(';').skip(1).find_map(|attr| {
        let (name, value) = attr.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("max-age") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}
