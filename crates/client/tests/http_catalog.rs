use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use flogin_client::{
    AuthError, AuthGateway, CatalogController, CatalogError, ClientConfig, Credentials,
    HttpCatalog, ListStatus, LoginController, LoginStatus, RemoteCatalog, SubmitOutcome,
};
use flogin_core::{CategoryId, ProductId};
use flogin_products::{Product, ProductDraft, ProductInput};
use serde_json::json;

#[derive(Default)]
struct Store {
    products: Vec<Product>,
    last_auth: Option<String>,
}

type Shared = Arc<Mutex<Store>>;

struct TestServer {
    base_url: String,
    store: Shared,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let store: Shared = Arc::new(Mutex::new(Store {
            products: vec![Product {
                id: ProductId::new(1),
                name: "Laptop Dell".to_string(),
                price: 15_000_000,
                quantity: 10,
                category_id: CategoryId::new(1),
                created_by_id: None,
            }],
            last_auth: None,
        }));

        let app = Router::new()
            .route("/api/products", get(list_products).post(create_product))
            .route(
                "/api/products/:id",
                get(get_product).put(update_product).delete(delete_product),
            )
            .route("/api/categories", get(list_categories))
            .route("/api/auth/login", post(login))
            .with_state(Arc::clone(&store));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, store, handle }
    }

    fn catalog(&self) -> HttpCatalog {
        let config = ClientConfig::default()
            .with_api_url(&self.base_url)
            .unwrap()
            .with_token("test-token");
        HttpCatalog::from_config(&config).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn remember_auth(store: &Shared, headers: &HeaderMap) {
    store.lock().unwrap().last_auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Không tìm thấy sản phẩm").into_response()
}

async fn list_products(State(store): State<Shared>, headers: HeaderMap) -> Json<Vec<Product>> {
    remember_auth(&store, &headers);
    Json(store.lock().unwrap().products.clone())
}

async fn get_product(State(store): State<Shared>, Path(id): Path<i64>) -> Response {
    let store = store.lock().unwrap();
    match store.products.iter().find(|p| p.id.get() == id) {
        Some(p) => Json(p.clone()).into_response(),
        None => not_found(),
    }
}

async fn create_product(State(store): State<Shared>, Json(input): Json<ProductInput>) -> Response {
    let mut store = store.lock().unwrap();
    if input.name == "Silent Reject" {
        return StatusCode::BAD_REQUEST.into_response();
    }
    if store.products.iter().any(|p| p.name == input.name) {
        return (StatusCode::BAD_REQUEST, "Tên sản phẩm đã tồn tại").into_response();
    }
    let id = store.products.iter().map(|p| p.id.get()).max().unwrap_or(0) + 1;
    let product = Product {
        id: ProductId::new(id),
        name: input.name,
        price: input.price,
        quantity: input.quantity,
        category_id: input.category_id,
        created_by_id: input.created_by_id,
    };
    store.products.push(product.clone());
    (StatusCode::CREATED, Json(product)).into_response()
}

async fn update_product(
    State(store): State<Shared>,
    Path(id): Path<i64>,
    Json(input): Json<ProductInput>,
) -> Response {
    let mut store = store.lock().unwrap();
    let Some(product) = store.products.iter_mut().find(|p| p.id.get() == id) else {
        return not_found();
    };
    product.name = input.name;
    product.price = input.price;
    product.quantity = input.quantity;
    product.category_id = input.category_id;
    Json(product.clone()).into_response()
}

async fn delete_product(State(store): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut store = store.lock().unwrap();
    let before = store.products.len();
    store.products.retain(|p| p.id.get() != id);
    if store.products.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_categories() -> Json<serde_json::Value> {
    Json(json!([
        { "id": 1, "name": "Electronics" },
        { "id": 2, "name": "Phones" }
    ]))
}

async fn login(Json(body): Json<serde_json::Value>) -> Response {
    let ok = body["username"] == "testuser" && body["password"] == "Test123";
    if body["username"] == "locked" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "", "token": null })),
        )
            .into_response();
    }
    if ok {
        Json(json!({ "message": "Đăng nhập thành công", "token": "mock-token-123" })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Sai tên tài khoản hoặc mật khẩu!", "token": null })),
        )
            .into_response()
    }
}

#[tokio::test]
async fn list_decodes_wire_names_and_sends_token() {
    let server = TestServer::spawn().await;
    let catalog = server.catalog();

    let products = catalog.list().await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Laptop Dell");
    assert_eq!(products[0].price, 15_000_000);
    assert_eq!(
        server.store.lock().unwrap().last_auth.as_deref(),
        Some("Bearer test-token")
    );
}

#[tokio::test]
async fn categories_are_listed() {
    let server = TestServer::spawn().await;
    let categories = server.catalog().list_categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[1].id, CategoryId::new(2));
}

#[tokio::test]
async fn missing_product_maps_to_not_found() {
    let server = TestServer::spawn().await;
    let catalog = server.catalog();

    let err = catalog.get(ProductId::new(999)).await.unwrap_err();
    assert_eq!(err, CatalogError::NotFound("Không tìm thấy sản phẩm".to_string()));

    let err = catalog.delete(ProductId::new(999)).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
}

#[tokio::test]
async fn bad_request_maps_to_validation_with_server_text() {
    let server = TestServer::spawn().await;
    let input = ProductInput {
        name: "Laptop Dell".to_string(),
        price: 1,
        quantity: 1,
        category_id: CategoryId::new(1),
        created_by_id: None,
    };

    let err = server.catalog().create(&input).await.unwrap_err();
    assert_eq!(err, CatalogError::Validation("Tên sản phẩm đã tồn tại".to_string()));
    assert_eq!(err.user_message(), "Tên sản phẩm đã tồn tại");
}

#[tokio::test]
async fn empty_bad_request_body_still_yields_a_form_message() {
    let server = TestServer::spawn().await;
    let controller = CatalogController::new(server.catalog());
    controller.load_all().await;
    controller.begin_create().await;

    let outcome = controller
        .submit_form(ProductDraft {
            name: "Silent Reject".to_string(),
            price: Some(1),
            quantity: Some(1),
            category_id: Some(CategoryId::new(1)),
            created_by_id: None,
        })
        .await;

    assert_eq!(outcome, SubmitOutcome::Failed(CatalogError::Validation(String::new())));
    let form = controller.snapshot().form.unwrap();
    assert_eq!(form.remote_error(), Some("request rejected"));
}

#[tokio::test]
async fn login_rejection_without_message_uses_fallback() {
    let server = TestServer::spawn().await;

    let err = server
        .catalog()
        .login(&Credentials::new("locked", "Test123"))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::Rejected("login rejected".to_string()));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let catalog = HttpCatalog::new("http://127.0.0.1:1");
    let err = catalog.list().await.unwrap_err();
    assert!(matches!(err, CatalogError::Network(_)));
}

#[tokio::test]
async fn controller_round_trip_over_http() {
    let server = TestServer::spawn().await;
    let controller = CatalogController::new(server.catalog());

    controller.load_all().await;
    assert_eq!(controller.snapshot().list.status(), ListStatus::Ready);

    controller.begin_create().await;
    assert_eq!(controller.snapshot().categories.map(|c| c.len()), Some(2));
    let outcome = controller
        .submit_form(ProductDraft {
            name: "Mouse".to_string(),
            price: Some(750_000),
            quantity: Some(200),
            category_id: Some(CategoryId::new(1)),
            created_by_id: None,
        })
        .await;
    assert!(matches!(outcome, SubmitOutcome::Saved(ref p) if p.id == ProductId::new(2)));
    assert_eq!(controller.snapshot().list.items().len(), 2);

    controller.begin_edit(ProductId::new(2)).await.unwrap();
    let mut draft = controller.snapshot().form.unwrap().fields().clone();
    draft.price = Some(800_000);
    controller.submit_form(draft).await;
    assert_eq!(
        controller.snapshot().list.find(ProductId::new(2)).map(|p| p.price),
        Some(800_000)
    );

    controller.begin_delete(ProductId::new(1)).unwrap();
    controller.confirm_delete().await;
    let snap = controller.snapshot();
    assert_eq!(snap.list.items().len(), 1);
    assert!(snap.banner.is_none());
}

#[tokio::test]
async fn login_returns_token_or_server_message() {
    let server = TestServer::spawn().await;
    let gateway = server.catalog();

    let token = gateway
        .login(&Credentials::new("testuser", "Test123"))
        .await
        .unwrap();
    assert_eq!(token.as_str(), "mock-token-123");

    let err = gateway
        .login(&Credentials::new("testuser", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::Rejected("Sai tên tài khoản hoặc mật khẩu!".to_string()));
}

#[tokio::test]
async fn login_controller_checks_fields_before_calling_server() {
    let server = TestServer::spawn().await;
    let login = LoginController::new(server.catalog());
    let sub = login.subscribe();

    let status = login.submit(Credentials::new("", "Test123")).await;
    assert_eq!(status, LoginStatus::Failed("username must not be blank".to_string()));

    let status = login.submit(Credentials::new("testuser", "Test123")).await;
    assert!(matches!(status, LoginStatus::Authenticated(_)));
    assert_eq!(login.session().username(), "testuser");
    assert!(login.session().token().is_some());

    let seen: Vec<LoginStatus> = std::iter::from_fn(|| sub.try_recv().ok())
        .map(|s| s.status().clone())
        .collect();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[1], LoginStatus::Submitting);

    login.reset();
    assert_eq!(login.session().status(), &LoginStatus::Idle);
}
