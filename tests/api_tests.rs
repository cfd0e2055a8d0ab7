use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, NaiveTime};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use transport_rostering::config::{EnvironmentConfig, RosteringPolicy};
use transport_rostering::models::{CustomerSnapshot, DriverSnapshot, TripSnapshot, TripStatus};
use transport_rostering::repositories::MemoryRosterRepository;
use transport_rostering::services::{DistanceTable, ProximityRanker};
use transport_rostering::state::AppState;

struct TestApp {
    router: Router,
    repository: Arc<MemoryRosterRepository>,
    tenant_id: Uuid,
}

impl TestApp {
    fn new() -> Self {
        Self::with_state(|repository| {
            AppState::new(EnvironmentConfig::default(), RosteringPolicy::default(), repository)
        })
    }

    fn with_proximity(proximity: Arc<dyn ProximityRanker>) -> Self {
        Self::with_state(|repository| {
            AppState::with_proximity(EnvironmentConfig::default(), RosteringPolicy::default(), repository, proximity)
        })
    }

    fn with_state(build: impl FnOnce(Arc<MemoryRosterRepository>) -> AppState) -> Self {
        let repository = Arc::new(MemoryRosterRepository::new());
        let state = build(repository.clone());
        Self {
            router: transport_rostering::create_app(state),
            repository,
            tenant_id: Uuid::new_v4(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("/api/tenants/{}{}", self.tenant_id, path)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn seed_trip(&self, customer: &CustomerSnapshot, driver_id: Option<Uuid>, pickup: (u32, u32)) -> TripSnapshot {
        let trip = self.trip_snapshot(customer, driver_id, pickup);
        self.repository.insert_trip(trip.clone()).await;
        trip
    }

    fn trip_snapshot(&self, customer: &CustomerSnapshot, driver_id: Option<Uuid>, pickup: (u32, u32)) -> TripSnapshot {
        TripSnapshot {
            id: Uuid::new_v4(),
            tenant_id: self.tenant_id,
            trip_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            pickup_time: NaiveTime::from_hms_opt(pickup.0, pickup.1, 0),
            return_time: NaiveTime::from_hms_opt(pickup.0 + 2, pickup.1, 0),
            driver_id,
            vehicle_id: None,
            customer_id: customer.id,
            customer_name: Some(customer.name.clone()),
            requires_wheelchair: false,
            passenger_count: None,
            status: TripStatus::Scheduled,
            version: 0,
        }
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "transport-rostering");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_check_conflicts_reports_blocked_driver() {
    let app = TestApp::new();
    let driver = DriverSnapshot::new(Uuid::new_v4(), "Dana");
    let mut customer = CustomerSnapshot::new(Uuid::new_v4(), "Ada");
    customer.blocked_driver_ids = vec![driver.id];
    app.repository.insert_driver(app.tenant_id, driver.clone()).await;
    app.repository.insert_customer(app.tenant_id, customer.clone()).await;

    let (status, body) = app
        .post(
            &app.url("/conflicts/check"),
            json!({
                "driver_id": driver.id,
                "customer_id": customer.id,
                "trip_date": "2025-03-10",
                "pickup_time": "09:00:00",
                "return_time": "11:00:00"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["can_proceed"], false);
    assert_eq!(body["data"]["has_critical_conflicts"], true);
    let findings = body["data"]["findings"].as_array().unwrap();
    assert!(findings
        .iter()
        .any(|f| f["severity"] == "critical" && f["category"] == "customer"));
}

#[tokio::test]
async fn test_check_conflicts_without_customer_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            &app.url("/conflicts/check"),
            json!({ "trip_date": "2025-03-10", "pickup_time": "09:00:00" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_check_conflicts_unknown_customer_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            &app.url("/conflicts/check"),
            json!({
                "customer_id": Uuid::new_v4(),
                "trip_date": "2025-03-10",
                "pickup_time": "09:00:00"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_storage_failure_returns_server_error() {
    let app = TestApp::new();
    app.repository.set_offline(true);

    let (status, body) = app
        .post(
            &app.url("/conflicts/check"),
            json!({
                "customer_id": Uuid::new_v4(),
                "trip_date": "2025-03-10",
                "pickup_time": "09:00:00"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "DB_ERROR");
}

#[tokio::test]
async fn test_availability_endpoint() {
    let app = TestApp::new();
    let driver = DriverSnapshot::new(Uuid::new_v4(), "Dana");
    let customer = CustomerSnapshot::new(Uuid::new_v4(), "Ada");
    app.repository.insert_driver(app.tenant_id, driver.clone()).await;
    app.repository.insert_customer(app.tenant_id, customer.clone()).await;
    let trip = app.seed_trip(&customer, Some(driver.id), (9, 0)).await;

    let (status, body) = app
        .get(&app.url(&format!("/availability/driver/{}?date=2025-03-10", driver.id)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["available"], false);
    assert_eq!(body["data"]["conflict_type"], "trip");
    assert_eq!(body["data"]["conflicting_trip_id"], trip.id.to_string());

    let (status, body) = app
        .get(&app.url(&format!("/availability/customer/{}?date=2025-03-11", customer.id)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["available"], true);

    let (status, _) = app
        .get(&app.url(&format!("/availability/vehicle/{}?date=2025-03-10", driver.id)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_workload_and_scan_reject_inverted_range() {
    let app = TestApp::new();

    let (status, _) = app.get(&app.url("/workload?start=2025-03-10&end=2025-03-01")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get(&app.url("/conflicts?start=2025-03-10&end=2025-03-01")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get(&app.url("/workload?start=2025-03-01&end=2025-03-10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["summary"]["total_drivers"], 0);
}

#[tokio::test]
async fn test_auto_assign_then_apply() {
    let app = TestApp::new();
    let driver = DriverSnapshot::new(Uuid::new_v4(), "Dana");
    let customer = CustomerSnapshot::new(Uuid::new_v4(), "Ada");
    app.repository.insert_driver(app.tenant_id, driver.clone()).await;
    app.repository.insert_customer(app.tenant_id, customer.clone()).await;
    let morning = app.seed_trip(&customer, None, (9, 0)).await;
    let clash = app.seed_trip(&customer, None, (10, 0)).await;

    let (status, body) = app
        .post(&app.url("/auto-assign"), json!({ "date": "2025-03-10" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let assignments = body["data"]["assignments"].as_array().unwrap().clone();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0]["trip_id"], morning.id.to_string());
    assert_eq!(body["data"]["unassigned"][0]["trip_id"], clash.id.to_string());

    let (status, body) = app
        .post(&app.url("/auto-assign/apply"), json!({ "proposals": assignments }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["applied"][0], morning.id.to_string());

    // La misma propuesta ya no vale: la versión del viaje cambió
    let (status, body) = app
        .post(&app.url("/auto-assign/apply"), json!({ "proposals": assignments }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_apply_requires_proposals() {
    let app = TestApp::new();
    let (status, body) = app
        .post(&app.url("/auto-assign/apply"), json!({ "proposals": [] }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_auto_assign_uses_configured_proximity() {
    let near = DriverSnapshot::new(Uuid::new_v4(), "Near");
    let far = DriverSnapshot::new(Uuid::new_v4(), "Far");
    let customer = CustomerSnapshot::new(Uuid::new_v4(), "Ada");
    let trip_id = Uuid::new_v4();

    let mut table = DistanceTable::new();
    table.insert(far.id, trip_id, 12.0);
    table.insert(near.id, trip_id, 0.5);
    let app = TestApp::with_proximity(Arc::new(table));

    // "Far" va primero en la lista
    app.repository.insert_driver(app.tenant_id, far.clone()).await;
    app.repository.insert_driver(app.tenant_id, near.clone()).await;
    app.repository.insert_customer(app.tenant_id, customer.clone()).await;
    let mut trip = app.trip_snapshot(&customer, None, (9, 0));
    trip.id = trip_id;
    app.repository.insert_trip(trip).await;

    let (status, body) = app
        .post(
            &app.url("/auto-assign"),
            json!({ "date": "2025-03-10", "balance_workload": false, "consider_proximity": true }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assignments"][0]["trip_id"], trip_id.to_string());
    assert_eq!(body["data"]["assignments"][0]["driver_id"], near.id.to_string());

    let (_, body) = app
        .post(
            &app.url("/auto-assign"),
            json!({ "date": "2025-03-10", "balance_workload": false }),
        )
        .await;
    assert_eq!(body["data"]["assignments"][0]["driver_id"], far.id.to_string());
}
