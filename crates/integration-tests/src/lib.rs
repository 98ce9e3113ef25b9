//! Integration test harness for SpaceMarket.
//!
//! Spins up an in-process fake of the SpaceMarket API with `axum`, bound to an
//! ephemeral port. The fake serves a fixed product list, accepts orders and
//! admin product creation, and records every request it receives so tests can
//! assert on request counts, headers and bodies.
//!
//! ```rust,ignore
//! let api = FakeApi::builder()
//!     .product(product_json("p1", "Star Tracker", 125_000, "Sensors", true))
//!     .start()
//!     .await?;
//! let storefront = api.storefront(Arc::new(MemoryStorage::new()));
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use spacemarket_admin::{AdminClient, AdminConfig};
use spacemarket_storefront::Storefront;
use spacemarket_storefront::cart::KeyValueStorage;
use spacemarket_storefront::config::StorefrontConfig;

/// Admin key accepted by the fake unless overridden.
pub const TEST_ADMIN_KEY: &str = "k9$Qm2!vX7#pL4@wR8^tZ1&nB6*yC3";

/// Build a product document as the API returns it.
#[must_use]
pub fn product_json(id: &str, name: &str, price: u64, category: &str, in_stock: bool) -> Value {
    json!({
        "_id": id,
        "name": name,
        "description": format!("{name} for small satellites"),
        "price": price,
        "image": format!("https://img.spacemarket.test/{id}.png"),
        "category": category,
        "stock": if in_stock { 5 } else { 0 },
        "inStock": in_stock,
    })
}

/// One request as seen by the fake API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// Header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

#[derive(Debug, Clone)]
struct Failure {
    status: StatusCode,
    message: Option<String>,
}

#[derive(Debug, Default)]
struct FakeState {
    admin_key: String,
    products: Mutex<Vec<Value>>,
    orders: Mutex<Vec<Value>>,
    requests: Mutex<Vec<RecordedRequest>>,
    order_failure: Mutex<Option<Failure>>,
    categories_unavailable: bool,
    search_delays: HashMap<String, Duration>,
    order_delay: Option<Duration>,
    next_id: AtomicU64,
}

impl FakeState {
    fn record(&self, method: Method, uri: &Uri, headers: HeaderMap, body: Option<Value>) {
        let query = uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        lock(&self.requests).push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            query,
            headers,
            body,
        });
    }

    fn new_id(&self) -> String {
        format!("{:024x}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get("x-admin-key")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|key| key == self.admin_key)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Configures a [`FakeApi`] before it starts.
#[derive(Debug, Default)]
pub struct FakeApiBuilder {
    state: FakeState,
}

impl FakeApiBuilder {
    /// Serve this product.
    #[must_use]
    pub fn product(self, product: Value) -> Self {
        lock(&self.state.products).push(product);
        self
    }

    /// Serve these products.
    #[must_use]
    pub fn products(self, products: impl IntoIterator<Item = Value>) -> Self {
        lock(&self.state.products).extend(products);
        self
    }

    /// Serve this order on the admin order listing.
    #[must_use]
    pub fn order(self, order: Value) -> Self {
        lock(&self.state.orders).push(order);
        self
    }

    /// Make `GET /products/categories` fail with 500.
    #[must_use]
    pub fn categories_unavailable(mut self) -> Self {
        self.state.categories_unavailable = true;
        self
    }

    /// Delay listing responses for a search term.
    #[must_use]
    pub fn delay_search(mut self, term: &str, delay: Duration) -> Self {
        self.state.search_delays.insert(term.to_string(), delay);
        self
    }

    /// Delay every order submission response.
    #[must_use]
    pub fn delay_orders(mut self, delay: Duration) -> Self {
        self.state.order_delay = Some(delay);
        self
    }

    /// Bind to an ephemeral port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(mut self) -> std::io::Result<FakeApi> {
        if self.state.admin_key.is_empty() {
            self.state.admin_key = TEST_ADMIN_KEY.to_string();
        }
        let state = Arc::new(self.state);

        let app = Router::new()
            .route("/api/products", get(list_products))
            .route("/api/products/{id}", get(get_product))
            .route("/products/categories", get(list_categories))
            .route("/api/orders", axum::routing::post(place_order))
            .route("/admin/orders", get(admin_orders))
            .route("/admin/products", axum::routing::post(admin_create_product))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Fake API stopped");
            }
        });

        Ok(FakeApi {
            addr,
            state,
            server,
        })
    }
}

/// A running fake API. The server stops when this is dropped.
#[derive(Debug)]
pub struct FakeApi {
    addr: SocketAddr,
    state: Arc<FakeState>,
    server: JoinHandle<()>,
}

impl FakeApi {
    #[must_use]
    pub fn builder() -> FakeApiBuilder {
        FakeApiBuilder::default()
    }

    /// Base URL of the fake.
    ///
    /// # Panics
    ///
    /// Never in practice: a socket address always forms a valid URL.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    /// Storefront configuration pointing at the fake.
    #[must_use]
    pub fn storefront_config(&self) -> StorefrontConfig {
        StorefrontConfig {
            api_url: self.url(),
            data_dir: std::env::temp_dir().join("spacemarket-unused"),
            http_timeout: Some(Duration::from_secs(5)),
        }
    }

    /// A storefront session against the fake, with the given cart storage.
    ///
    /// # Panics
    ///
    /// Panics if the API client cannot be built.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn storefront(&self, storage: Arc<dyn KeyValueStorage>) -> Storefront {
        Storefront::with_storage(self.storefront_config(), storage).unwrap()
    }

    /// Admin configuration pointing at the fake with the given key.
    #[must_use]
    pub fn admin_config(&self, admin_key: &str) -> AdminConfig {
        AdminConfig {
            api_url: self.url(),
            admin_key: admin_key.to_string().into(),
            http_timeout: Some(Duration::from_secs(5)),
        }
    }

    /// An admin client sending [`TEST_ADMIN_KEY`].
    ///
    /// # Panics
    ///
    /// Panics if the admin client cannot be built.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn admin(&self) -> AdminClient {
        AdminClient::new(&self.admin_config(TEST_ADMIN_KEY)).unwrap()
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }

    /// Requests received for one method and path.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<RecordedRequest> {
        lock(&self.state.requests)
            .iter()
            .filter(|r| r.method == *method && r.path == path)
            .cloned()
            .collect()
    }

    /// Make subsequent order submissions fail, or succeed again with `None`.
    pub fn fail_orders(&self, failure: Option<(StatusCode, Option<&str>)>) {
        *lock(&self.state.order_failure) = failure.map(|(status, message)| Failure {
            status,
            message: message.map(str::to_string),
        });
    }

    /// Orders accepted so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        lock(&self.state.orders).clone()
    }

    /// Products currently served, including admin-created ones.
    #[must_use]
    pub fn products(&self) -> Vec<Value> {
        lock(&self.state.products).clone()
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

type Shared = State<Arc<FakeState>>;

fn error(status: StatusCode, message: Option<&str>) -> Response {
    match message {
        Some(message) => (status, axum::Json(json!({ "message": message }))).into_response(),
        None => status.into_response(),
    }
}

async fn list_products(
    State(state): Shared,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.record(method, &uri, headers, None);

    let search = params.get("search").map(|s| s.to_lowercase());
    if let Some(delay) = search.as_ref().and_then(|s| state.search_delays.get(s)) {
        tokio::time::sleep(*delay).await;
    }

    let category = params.get("category");
    let limit = params
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(usize::MAX);

    let products: Vec<Value> = lock(&state.products)
        .iter()
        .filter(|p| {
            search.as_ref().is_none_or(|term| {
                p["name"]
                    .as_str()
                    .is_some_and(|name| name.to_lowercase().contains(term))
            })
        })
        .filter(|p| category.is_none_or(|c| p["category"].as_str() == Some(c.as_str())))
        .take(limit)
        .cloned()
        .collect();

    axum::Json(json!({ "success": true, "data": products })).into_response()
}

async fn get_product(
    State(state): Shared,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.record(method, &uri, headers, None);

    let product = lock(&state.products)
        .iter()
        .find(|p| p["_id"].as_str() == Some(id.as_str()))
        .cloned();

    match product {
        Some(product) => axum::Json(json!({ "success": true, "data": product })).into_response(),
        None => error(StatusCode::NOT_FOUND, Some("Product not found")),
    }
}

async fn list_categories(
    State(state): Shared,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    state.record(method, &uri, headers, None);

    if state.categories_unavailable {
        return error(StatusCode::INTERNAL_SERVER_ERROR, Some("Database unavailable"));
    }

    let mut categories: Vec<String> = lock(&state.products)
        .iter()
        .filter_map(|p| p["category"].as_str().map(str::to_string))
        .collect();
    categories.sort();
    categories.dedup();

    axum::Json(json!({ "success": true, "data": categories })).into_response()
}

async fn place_order(
    State(state): Shared,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    state.record(method, &uri, headers, body.clone());

    if let Some(delay) = state.order_delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(failure) = lock(&state.order_failure).clone() {
        return error(failure.status, failure.message.as_deref());
    }
    let Some(body) = body else {
        return error(StatusCode::BAD_REQUEST, Some("Invalid order"));
    };

    let order = json!({
        "_id": state.new_id(),
        "items": body["items"],
        "customerInfo": body["customerInfo"],
        "status": "pending",
    });
    lock(&state.orders).push(order.clone());

    (
        StatusCode::CREATED,
        axum::Json(json!({
            "success": true,
            "message": "Order placed successfully",
            "data": order,
        })),
    )
        .into_response()
}

async fn admin_orders(
    State(state): Shared,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let authorized = state.authorized(&headers);
    state.record(method, &uri, headers, None);

    if !authorized {
        return error(StatusCode::UNAUTHORIZED, Some("Unauthorized"));
    }
    let orders = lock(&state.orders).clone();
    axum::Json(json!({ "success": true, "data": orders })).into_response()
}

async fn admin_create_product(
    State(state): Shared,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorized = state.authorized(&headers);
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    state.record(method, &uri, headers, body.clone());

    if !authorized {
        return error(StatusCode::UNAUTHORIZED, Some("Unauthorized"));
    }
    let Some(mut product) = body.filter(Value::is_object) else {
        return error(StatusCode::BAD_REQUEST, Some("Invalid product"));
    };

    product["_id"] = Value::String(state.new_id());
    lock(&state.products).push(product.clone());

    (
        StatusCode::CREATED,
        axum::Json(json!({ "success": true, "data": product })),
    )
        .into_response()
}
