//! API integration tests
//!
//! The router tests run in-process over the in-memory store. The tests marked
//! `#[ignore]` target a running server.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use reqwest::Client;
use serde_json::{json, Value};
use tower::ServiceExt;

use catalogue_server::{
    api::create_router,
    client::{ApiClient, CatalogBackend, CatalogController, StatsDashboard, StatusKind},
    models::{LoanAction, Record, RecordId, SearchQuery},
    repository::Repository,
    AppConfig, AppState,
};

const BASE_URL: &str = "http://localhost:3000/api";

fn oid(n: u32) -> String {
    format!("{:024x}", n)
}

fn record(n: u32, fields: Value, marker: &str) -> Record {
    serde_json::from_value(json!({
        "_id": oid(n),
        "fields": fields,
        "FIELD9": marker,
    }))
    .expect("valid record")
}

fn app(records: Vec<Record>) -> Router {
    create_router(AppState::new(AppConfig::default(), Repository::memory(records)))
}

/// Twelve BD records with reservations 1..=12, plus a few other types
fn catalog() -> Vec<Record> {
    let mut records: Vec<Record> = (1..=12)
        .map(|n| {
            record(
                n,
                json!({
                    "titre_avec_lien_vers_le_catalogue": format!("Album {:02}", n),
                    "auteur": "Hergé",
                    "type_de_document": "BD",
                    "nombre_de_reservations": n,
                }),
                "",
            )
        })
        .collect();
    records.push(record(
        13,
        json!({"titre_avec_lien_vers_le_catalogue": "Le Petit Prince", "auteur": "Saint-Exupéry", "type_de_document": "Roman", "nombre_de_reservations": 2}),
        "2024-03-01T10:00:00.000Z",
    ));
    records.push(record(
        14,
        json!({"titre_avec_lien_vers_le_catalogue": "Germinal", "auteur": "Zola", "type_de_document": "Roman", "nombre_de_reservations": null}),
        "",
    ));
    records.push(record(
        15,
        json!({"titre_avec_lien_vers_le_catalogue": "Nana", "auteur": "Zola", "type_de_document": "Roman", "nombre_de_reservations": "5"}),
        "",
    ));
    records.push(record(16, json!({"type_de_document": ""}), ""));
    records
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = get(&app(vec![]), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_list_second_page_by_reservations() {
    let app = app(catalog());
    let (status, body) = get(&app, "/api/livres?type=BD&sort=reservations&page=2&limit=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 5);
    assert_eq!(body["total"], 12);
    assert_eq!(body["page"], 2);
    assert_eq!(body["totalPages"], 3);

    let reservations: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["fields"]["nombre_de_reservations"].as_i64().unwrap())
        .collect();
    assert_eq!(reservations, vec![7, 6, 5, 4, 3]);
}

#[tokio::test]
async fn test_list_defaults() {
    let app = app(catalog());
    let (status, body) = get(&app, "/api/livres").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 9);
    assert_eq!(body["total"], 16);
    assert_eq!(body["page"], 1);
    assert_eq!(body["totalPages"], 2);
    // Alphabetical: the record without a title comes first
    assert!(body["data"][0]["fields"]["titre_avec_lien_vers_le_catalogue"].is_null());
    assert_eq!(body["data"][1]["fields"]["titre_avec_lien_vers_le_catalogue"], "Album 01");
}

#[tokio::test]
async fn test_empty_result_has_zero_pages() {
    let app = app(catalog());
    let (status, body) = get(&app, "/api/livres?type=DVD").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["total"], 0);
    assert_eq!(body["totalPages"], 0);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_type_sentinel_disables_filter() {
    let app = app(catalog());
    let (_, body) = get(&app, "/api/livres?type=tous&limit=100").await;
    assert_eq!(body["total"], 16);
}

#[tokio::test]
async fn test_availability_partitions_catalog() {
    let app = app(catalog());
    let (_, all) = get(&app, "/api/livres?disponibilite=tous").await;
    let (_, available) = get(&app, "/api/livres?disponibilite=disponible").await;
    let (_, checked_out) = get(&app, "/api/livres?disponibilite=emprunte").await;

    assert_eq!(checked_out["total"], 1);
    assert_eq!(
        available["total"].as_i64().unwrap() + checked_out["total"].as_i64().unwrap(),
        all["total"].as_i64().unwrap()
    );
    assert_eq!(checked_out["data"][0]["_id"], oid(13));
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let app = app(catalog());
    let (_, body) = get(&app, "/api/livres?search=petit").await;
    assert_eq!(body["total"], 1);
    assert_eq!(
        body["data"][0]["fields"]["titre_avec_lien_vers_le_catalogue"],
        "Le Petit Prince"
    );

    let (_, body) = get(&app, "/api/livres/search?q=ZOLA").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_search_matches_metacharacters_literally() {
    let app = app(catalog());
    let (status, body) = get(&app, "/api/livres/search?q=.*").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_types_are_distinct_and_non_empty() {
    let app = app(catalog());
    let (status, body) = get(&app, "/api/livres/types").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!(["BD", "Roman"]));
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_invalid_pagination_is_rejected() {
    let app = app(catalog());
    for uri in [
        "/api/livres?page=0",
        "/api/livres?limit=0",
        "/api/livres?page=abc",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_large_limit_returns_everything() {
    let app = app(catalog());
    let (status, body) = get(&app, "/api/livres?limit=150").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 16);
    assert_eq!(body["total"], 16);
    assert_eq!(body["page"], 1);
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn test_checkout_then_return() {
    let app = app(catalog());
    let uri = format!("/api/livres/{}", oid(1));

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"action": "emprunter"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Livre emprunté"}));

    let (_, listing) = get(&app, "/api/livres?disponibilite=emprunte&sort=alpha").await;
    assert_eq!(listing["total"], 2);
    let marker = listing["data"][0]["FIELD9"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(marker).is_ok());

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"action": "retourner"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Livre retourné");

    let (_, listing) = get(&app, "/api/livres?search=Album%2001").await;
    assert_eq!(listing["data"][0]["FIELD9"], "");
}

#[tokio::test]
async fn test_loan_errors() {
    let app = app(catalog());

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/livres/{}", oid(999)),
        Some(json!({"action": "emprunter"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "Document non trouvé"}));

    // Nothing was checked out by the failed request
    let (_, listing) = get(&app, "/api/livres?disponibilite=emprunte").await;
    assert_eq!(listing["total"], 1);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/livres/{}", oid(1)),
        Some(json!({"action": "voler"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Action invalide");

    let (status, body) = send(&app, Method::PATCH, "/api/livres/not-an-id", Some(json!({"action": "retourner"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, Method::PATCH, "/api/livres/%FF", Some(json!({"action": "retourner"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let (_, listing) = get(&app, "/api/livres?disponibilite=emprunte").await;
    assert_eq!(listing["total"], 1);
}

#[tokio::test]
async fn test_loan_id_is_case_insensitive() {
    let app = app(vec![record(
        0xab,
        json!({"titre_avec_lien_vers_le_catalogue": "Persepolis"}),
        "",
    )]);
    let uri = format!("/api/livres/{}", oid(0xab).to_ascii_uppercase());

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"action": "emprunter"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Livre emprunté");

    let (_, listing) = get(&app, "/api/livres?disponibilite=emprunte").await;
    assert_eq!(listing["data"][0]["_id"], oid(0xab));
}

#[tokio::test]
async fn test_missing_body_reports_missing_action() {
    let app = app(catalog());
    let uri = format!("/api/livres/{}", oid(1));

    let (status, body) = send(&app, Method::PATCH, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "Action invalide"}));

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Action invalide");
}

#[tokio::test]
async fn test_stats() {
    let app = app(catalog());
    let (status, body) = get(&app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let stats = &body["stats"];
    assert_eq!(stats["totalLivres"], 16);
    assert_eq!(stats["topAuteurs"][0], json!({"_id": "Hergé", "count": 12}));
    assert_eq!(stats["typesDocuments"][0], json!({"_id": "BD", "count": 12}));

    let roman = stats["reservationsParType"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["_id"] == "Roman")
        .unwrap();
    assert_eq!(roman["totalReservations"], 7);
    assert_eq!(roman["nombreDocuments"], 3);
    let average = roman["moyenneReservations"].as_f64().unwrap();
    assert!((average - 7.0 / 3.0).abs() < 1e-9);

    let dashboard: catalogue_server::models::CatalogStats = serde_json::from_value(stats.clone()).unwrap();
    let dashboard = StatsDashboard::from(&dashboard);
    assert_eq!(dashboard.overview.reservations, 85);
}

#[tokio::test]
async fn test_stats_with_huge_reservation_counts() {
    let app = app(vec![
        record(1, json!({"type_de_document": "BD", "nombre_de_reservations": 9000000000000000000i64}), ""),
        record(2, json!({"type_de_document": "BD", "nombre_de_reservations": "99999999999999999999"}), ""),
    ]);
    let (status, body) = get(&app, "/api/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["reservationsParType"][0]["totalReservations"], i64::MAX);
}

#[tokio::test]
async fn test_openapi_is_served() {
    let (status, body) = get(&app(vec![]), "/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/livres"].is_object());
}

/// Serve the router on a local port and return the API base URL
async fn serve(records: Vec<Record>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app(records);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

#[tokio::test]
async fn test_api_client_over_http() {
    let client = ApiClient::new(serve(catalog()).await);

    let found = client
        .search(&SearchQuery {
            q: Some("zola".to_string()),
            document_type: Some("Roman".to_string()),
        })
        .await
        .unwrap();
    assert!(found.success);
    assert_eq!(found.count, 2);

    let id: RecordId = oid(2).parse().unwrap();
    let message = client.set_loan_state(&id, LoanAction::Checkout).await.unwrap();
    assert_eq!(message, "Livre emprunté");

    let unknown: RecordId = oid(999).parse().unwrap();
    let err = client.set_loan_state(&unknown, LoanAction::Return).await.unwrap_err();
    assert_eq!(err.to_string(), "Document non trouvé");

    let (status, dashboard) = StatsDashboard::load(&client).await;
    assert_eq!(status.kind, StatusKind::Success);
    assert_eq!(dashboard.unwrap().overview.documents, 16);
}

// Live server tests

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_live_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_live_catalog_browsing() {
    let backend = std::sync::Arc::new(ApiClient::new(BASE_URL));

    let types = backend.document_types().await.expect("Failed to load types");
    assert!(types.iter().all(|t| !t.is_empty()));

    let controller = CatalogController::new(backend.clone());
    controller.init().await;
    let page = controller.with_view(|v| v.page_state).await;
    assert_eq!(page.current_page, 1);
}

#[tokio::test]
#[ignore]
async fn test_live_loan_round_trip() {
    let client = ApiClient::new(BASE_URL);
    let listing = client
        .list_records(&Default::default())
        .await
        .expect("Failed to list records");
    let Some(first) = listing.data.first() else {
        return;
    };
    let id: RecordId = first.id.clone();

    let message = client
        .set_loan_state(&id, LoanAction::Checkout)
        .await
        .expect("Failed to check out");
    assert_eq!(message, "Livre emprunté");

    let message = client
        .set_loan_state(&id, LoanAction::Return)
        .await
        .expect("Failed to return");
    assert_eq!(message, "Livre retourné");
}

#[tokio::test]
#[ignore]
async fn test_live_stats() {
    let client = ApiClient::new(BASE_URL);
    let stats = client.stats().await.expect("Failed to load stats");
    assert!(stats.top_auteurs.len() <= 10);
}
