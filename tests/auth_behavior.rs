//! Behavior tests for the authentication call pipeline: callback-marker
//! extraction, token-cookie handling, and failure classification.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bookwire_core::{
    AuthClient, CallError, ErrorCode, HttpClient, HttpError, HttpRequest, HttpResponse,
    UpstreamConfig, UpstreamGate,
};
use time::OffsetDateTime;

struct ScriptedHttpClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn single(response: HttpResponse) -> Self {
        Self::new(vec![Ok(response)])
    }

    fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        let response = {
            let mut responses = self
                .responses
                .lock()
                .expect("response script should not be poisoned");
            if responses.is_empty() {
                Ok(HttpResponse::ok_json("{}"))
            } else {
                responses.remove(0)
            }
        };
        Box::pin(async move { response })
    }
}

fn config() -> UpstreamConfig {
    UpstreamConfig::new("https://booking.example.test")
}

fn open_gate() -> UpstreamGate {
    UpstreamGate::new(Duration::from_secs(60), 100)
}

fn client_with(http: Arc<ScriptedHttpClient>) -> AuthClient {
    AuthClient::new(http, open_gate(), &config())
}

#[tokio::test]
async fn successful_auth_extracts_session_token_and_expiry() {
    let http = Arc::new(ScriptedHttpClient::single(
        HttpResponse::ok_json(r#"{"callback": "sw.auth.complete('abc123')"}"#)
            .with_header("set-cookie", "lang=en; Path=/")
            .with_header("set-cookie", "token=tok1; Max-Age=3600; Path=/; HttpOnly"),
    ));
    let client = client_with(Arc::clone(&http));

    let session = client
        .authenticate("79001234567", "hunter2")
        .await
        .expect("auth should succeed");

    assert_eq!(session.session_id, "abc123");
    assert_eq!(session.token, "tok1");
    let expected = OffsetDateTime::now_utc() + time::Duration::seconds(3600);
    assert!((session.expires_at - expected).abs() <= time::Duration::seconds(1));

    let requests = http.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url,
        "https://booking.example.test/ajax/user/auth/"
    );
    assert_eq!(
        requests[0].headers.get("content-type").map(String::as_str),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        requests[0].body.as_deref(),
        Some("number=79001234567&password=hunter2")
    );
}

#[tokio::test]
async fn absent_max_age_falls_back_to_thirty_days() {
    let http = Arc::new(ScriptedHttpClient::single(
        HttpResponse::ok_json(r#"{"callback": "sw.auth.complete('abc123')"}"#)
            .with_header("set-cookie", "token=tok1; Path=/"),
    ));
    let client = client_with(http);

    let session = client
        .authenticate("79001234567", "hunter2")
        .await
        .expect("auth should succeed");

    let expected = OffsetDateTime::now_utc() + time::Duration::days(30);
    assert!((session.expires_at - expected).abs() <= time::Duration::seconds(1));
}

#[tokio::test]
async fn missing_callback_marker_is_an_unknown_failure() {
    let http = Arc::new(ScriptedHttpClient::single(
        HttpResponse::ok_json(r#"{"callback": "sw.auth.error('denied')"}"#)
            .with_header("set-cookie", "token=tok1; Max-Age=3600"),
    ));
    let client = client_with(http);

    let error = client
        .authenticate("79001234567", "hunter2")
        .await
        .expect_err("marker absent should fail");

    assert!(matches!(
        error,
        CallError::Api {
            code: ErrorCode::Unknown,
            ..
        }
    ));
}

#[tokio::test]
async fn missing_token_cookie_is_an_empty_response_failure() {
    let http = Arc::new(ScriptedHttpClient::single(
        HttpResponse::ok_json(r#"{"callback": "sw.auth.complete('abc123')"}"#)
            .with_header("set-cookie", "lang=en; Path=/"),
    ));
    let client = client_with(http);

    let error = client
        .authenticate("79001234567", "hunter2")
        .await
        .expect_err("missing token cookie should fail");

    assert!(matches!(
        error,
        CallError::Api {
            code: ErrorCode::EmptyResponse,
            ..
        }
    ));
}

#[tokio::test]
async fn empty_body_is_an_empty_response_failure() {
    let http = Arc::new(ScriptedHttpClient::single(HttpResponse::ok_json("")));
    let client = client_with(http);

    let error = client
        .authenticate("79001234567", "hunter2")
        .await
        .expect_err("empty body should fail");

    assert_eq!(error.code_str(), "EMPTY_RESPONSE");
}

#[tokio::test]
async fn http_error_with_structured_body_decodes_the_upstream_code() {
    let http = Arc::new(ScriptedHttpClient::single(HttpResponse {
        status: 401,
        headers: Vec::new(),
        body: String::from(
            r#"{"error": {"code": "USER_AUTHORISATION_DATA_ERROR", "message": "Wrong login or password"}}"#,
        ),
    }));
    let client = client_with(http);

    let error = client
        .authenticate("79001234567", "wrong")
        .await
        .expect_err("401 should fail");

    assert_eq!(
        error,
        CallError::api(
            ErrorCode::UserAuthorisationDataError,
            "USER_AUTHORISATION_DATA_ERROR",
            "Wrong login or password"
        )
    );
    assert_eq!(error.http_status(), 401);
}

#[tokio::test]
async fn http_error_without_structured_body_carries_the_status() {
    let http = Arc::new(ScriptedHttpClient::single(HttpResponse {
        status: 502,
        headers: Vec::new(),
        body: String::from("Bad Gateway"),
    }));
    let client = client_with(http);

    let error = client
        .authenticate("79001234567", "hunter2")
        .await
        .expect_err("502 should fail");

    assert_eq!(error, CallError::http(502, "HTTP 502"));
}

#[tokio::test]
async fn transport_failure_is_a_network_failure() {
    let http = Arc::new(ScriptedHttpClient::new(vec![Err(HttpError::new(
        "connection reset by peer",
    ))]));
    let client = client_with(http);

    let error = client
        .authenticate("79001234567", "hunter2")
        .await
        .expect_err("transport fault should fail");

    assert_eq!(error, CallError::network("connection reset by peer"));
}

#[tokio::test]
async fn rate_limited_auth_never_reaches_the_transport() {
    let http = Arc::new(ScriptedHttpClient::single(HttpResponse::ok_json("{}")));
    let gate = UpstreamGate::new(Duration::from_secs(60), 1);
    gate.try_admit().expect("consume the only slot");
    let client = AuthClient::new(Arc::clone(&http) as Arc<dyn HttpClient>, gate, &config());

    let error = client
        .authenticate("79001234567", "hunter2")
        .await
        .expect_err("gate should reject");

    assert_eq!(error, CallError::RateLimited);
    assert!(http.recorded_requests().is_empty());
}
