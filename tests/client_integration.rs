use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::any,
    Json, Router,
};
use serde_json::{json, Value as JsonValue};
use travelsearch_testkit::{
    places, ApiClient, ClientOptions, FlightQuery, FlightsClient, HarnessError, PlacesClient,
    RequestSpec,
};

#[derive(Clone)]
struct MockResponse {
    status: StatusCode,
    body: JsonValue,
    delay: Duration,
}

impl MockResponse {
    fn json(status: StatusCode, body: JsonValue) -> Self {
        Self {
            status,
            body,
            delay: Duration::from_millis(0),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone)]
struct MockState {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    hits: Arc<AtomicUsize>,
    seen_authorization: Arc<Mutex<Option<String>>>,
    seen_query: Arc<Mutex<Option<String>>>,
    seen_body: Arc<Mutex<Option<String>>>,
}

async fn mock_handler(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state
        .seen_authorization
        .lock()
        .expect("authorization mutex must not be poisoned") = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    *state
        .seen_query
        .lock()
        .expect("query mutex must not be poisoned") = uri.query().map(str::to_owned);
    *state
        .seen_body
        .lock()
        .expect("body mutex must not be poisoned") = Some(body);

    let response = {
        let mut queue = state
            .responses
            .lock()
            .expect("response queue mutex must not be poisoned");
        queue.pop_front().unwrap_or_else(|| {
            MockResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "no mock response available"}),
            )
        })
    };

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    (response.status, Json(response.body))
}

struct TestServer {
    base_url: String,
    state: MockState,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl TestServer {
    fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    fn seen_authorization(&self) -> Option<String> {
        self.state
            .seen_authorization
            .lock()
            .expect("authorization mutex must not be poisoned")
            .clone()
    }

    fn seen_query(&self) -> Option<String> {
        self.state
            .seen_query
            .lock()
            .expect("query mutex must not be poisoned")
            .clone()
    }

    fn seen_body(&self) -> Option<String> {
        self.state
            .seen_body
            .lock()
            .expect("body mutex must not be poisoned")
            .clone()
    }
}

async fn spawn_server(responses: Vec<MockResponse>) -> TestServer {
    let state = MockState {
        responses: Arc::new(Mutex::new(responses.into())),
        hits: Arc::new(AtomicUsize::new(0)),
        seen_authorization: Arc::new(Mutex::new(None)),
        seen_query: Arc::new(Mutex::new(None)),
        seen_body: Arc::new(Mutex::new(None)),
    };

    let app = Router::new()
        .route("/", any(mock_handler))
        .route("/*path", any(mock_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    let address = listener.local_addr().expect("must have local addr");
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock server must run");
    });

    TestServer {
        base_url: format!("http://{address}"),
        state,
        task,
    }
}

fn fast_options(retry_budget: usize) -> ClientOptions {
    ClientOptions {
        timeout_ms: 1_000,
        retry_budget,
        retry_delay_ms: 1,
    }
}

fn sochi_places_body() -> JsonValue {
    json!([
        {"type": "city", "name": "Sochi", "code": "AER", "country_name": "Russia"},
        {"type": "airport", "name": "Adler", "city_name": "Sochi", "code": "AER"}
    ])
}

#[tokio::test]
async fn expect_ok_decodes_success_body() {
    let server = spawn_server(vec![MockResponse::json(StatusCode::OK, json!({"a": 1}))]).await;
    let client = ApiClient::new(&server.base_url).with_options(fast_options(1));

    let decoded = client
        .send(RequestSpec::get(""))
        .await
        .expect("request must succeed")
        .expect_ok()
        .expect("status must be 200");

    assert_eq!(decoded, json!({"a": 1}));
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn expect_ok_surfaces_404_with_body() {
    let server = spawn_server(vec![MockResponse::json(
        StatusCode::NOT_FOUND,
        json!({"error": "no such place"}),
    )])
    .await;
    let client = ApiClient::new(&server.base_url).with_options(fast_options(1));

    let err = client
        .send(RequestSpec::get(""))
        .await
        .expect("transport must succeed")
        .expect_ok()
        .expect_err("status must mismatch");

    match err {
        HarnessError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("no such place"));
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn error_status_does_not_consume_retry_budget() {
    let server = spawn_server(vec![MockResponse::json(
        StatusCode::BAD_REQUEST,
        json!({"error": "bad date"}),
    )])
    .await;
    let client = ApiClient::new(&server.base_url).with_options(fast_options(3));

    let raw = client
        .send(RequestSpec::get(""))
        .await
        .expect("a 400 response is not a transport fault");

    assert_eq!(raw.status, 400);
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn transport_faults_exhaust_exact_retry_budget() {
    let delayed = MockResponse::json(StatusCode::OK, json!({"a": 1}))
        .with_delay(Duration::from_millis(300));
    let server = spawn_server(vec![delayed.clone(), delayed.clone(), delayed]).await;
    let client = ApiClient::new(&server.base_url).with_options(ClientOptions {
        timeout_ms: 30,
        retry_budget: 3,
        retry_delay_ms: 1,
    });

    let err = client
        .send(RequestSpec::get(""))
        .await
        .expect_err("every attempt must time out");

    match err {
        HarnessError::RequestFailed { attempts, source } => {
            assert_eq!(attempts, 3);
            assert!(source.is_timeout());
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
    assert_eq!(server.hits(), 3);
}

#[tokio::test]
async fn single_transport_fault_then_success_uses_two_attempts() {
    let server = spawn_server(vec![
        MockResponse::json(StatusCode::OK, json!({"slow": true}))
            .with_delay(Duration::from_millis(300)),
        MockResponse::json(StatusCode::OK, json!({"a": 1})),
    ])
    .await;
    let client = ApiClient::new(&server.base_url).with_options(ClientOptions {
        timeout_ms: 50,
        retry_budget: 3,
        retry_delay_ms: 1,
    });

    let decoded = client
        .send(RequestSpec::get(""))
        .await
        .expect("second attempt must succeed")
        .expect_ok()
        .expect("status must be 200");

    assert_eq!(decoded, json!({"a": 1}));
    assert_eq!(server.hits(), 2);
}

#[tokio::test]
async fn authorization_header_rides_every_request() {
    let server = spawn_server(vec![MockResponse::json(StatusCode::OK, json!({}))]).await;
    let client = ApiClient::with_token(&server.base_url, "secret").with_options(fast_options(1));

    client
        .send(RequestSpec::get("/v1/anything"))
        .await
        .expect("request must succeed");

    assert_eq!(server.seen_authorization().as_deref(), Some("Token secret"));
}

#[tokio::test]
async fn relative_paths_hit_resolved_endpoint() {
    let server = spawn_server(vec![MockResponse::json(StatusCode::OK, json!({"ok": true}))]).await;
    let client = ApiClient::new(format!("{}/v1/", server.base_url)).with_options(fast_options(1));

    let raw = client
        .send(RequestSpec::get("flights/search").query("limit", "5"))
        .await
        .expect("request must succeed");

    assert_eq!(raw.status, 200);
    assert_eq!(server.seen_query().as_deref(), Some("limit=5"));
}

#[tokio::test]
async fn places_search_returns_sochi_city() {
    let server = spawn_server(vec![MockResponse::json(StatusCode::OK, sochi_places_body())]).await;
    let suggest = PlacesClient::new(format!("{}/places2", server.base_url))
        .with_options(fast_options(1));

    let found = suggest
        .search_post("Sochi", "en")
        .await
        .expect("search must succeed");

    let cities = places::city_names(&found);
    assert!(cities.contains(&"Sochi".to_owned()), "cities: {cities:?}");
    assert_eq!(places::iata_codes(&found), vec!["AER".to_owned()]);

    let query = server.seen_query().expect("query string must be captured");
    assert!(query.contains("term=Sochi"), "query: {query}");
    assert!(query.contains("locale=en"), "query: {query}");
}

#[tokio::test]
async fn flight_search_posts_query_and_decodes_body() {
    let server = spawn_server(vec![MockResponse::json(
        StatusCode::OK,
        json!({"search_id": "abc", "data": []}),
    )])
    .await;
    let flights =
        FlightsClient::new(&server.base_url, "api-key").with_options(fast_options(1));

    let response = flights
        .search(&FlightQuery::one_way("MOW", "AER", "2026-09-15"))
        .await
        .expect("search must succeed");

    assert_eq!(response["search_id"], json!("abc"));
    assert_eq!(server.seen_authorization().as_deref(), Some("Token api-key"));

    let body: JsonValue = serde_json::from_str(&server.seen_body().expect("body must be captured"))
        .expect("request body must be JSON");
    assert_eq!(body["origin"], json!("MOW"));
    assert_eq!(body.get("return_date"), None);
}

#[tokio::test]
async fn flight_search_past_date_400_is_an_accepted_outcome() {
    let server = spawn_server(vec![MockResponse::json(
        StatusCode::BAD_REQUEST,
        json!({"error": "depart_date is in the past"}),
    )])
    .await;
    let flights =
        FlightsClient::new(&server.base_url, "api-key").with_options(fast_options(3));

    let raw = flights
        .search_raw(&FlightQuery::one_way("MOW", "AER", "2026-08-01"))
        .await
        .expect("a 400 response is not a transport fault");

    assert_eq!(raw.status, 400);
    assert_eq!(server.hits(), 1);
}
