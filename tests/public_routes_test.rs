mod common;

use actix_web::test;
use serde_json::{json, Value};

use common::{days_from_today, TestApp};
use tourbook_api::db::store::Store;
use tourbook_api::models::stop_sale::StopSale;

#[actix_rt::test]
async fn test_liveness_and_health() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(test::read_body(resp).await, "OK");

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["services"]["store"]["status"], "ok");
    assert_eq!(body["services"]["payments"]["status"], "ok");
}

#[actix_rt::test]
async fn test_health_reports_disabled_integrations() {
    let test_app = TestApp::bare();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["services"]["payments"]["status"], "disabled");
    assert_eq!(body["services"]["storage"]["status"], "disabled");
}

#[actix_rt::test]
async fn test_list_tours_hides_unpublished_and_searches() {
    let test_app = TestApp::new();
    let published = test_app.seed_tour("default", "cliffs-of-moher").await;
    let mut draft = test_app.seed_tour("default", "ring-of-kerry").await;
    draft.is_published = false;
    draft.title = "Ring of Kerry".to_string();
    test_app.store.replace_tour(&draft).await.unwrap();

    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/tours").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    let tours = body["data"].as_array().unwrap();
    assert_eq!(tours.len(), 1);
    assert_eq!(tours[0]["_id"], published.id.as_str());

    let req = test::TestRequest::get()
        .uri("/api/tours?search=cliffs")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/tours?search=kerry")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/api/tours/{}", draft.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Tour not found"));
}

#[actix_rt::test]
async fn test_tenants_are_isolated() {
    let test_app = TestApp::new();
    let tour = test_app.seed_tour("acme", "cliffs-of-moher").await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/tours/{}", tour.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tours/{}", tour.id))
        .insert_header(("X-Tenant-Id", "acme"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/tours")
        .insert_header(("X-Tenant-Id", "Not A Tenant"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_availability_calendar() {
    let test_app = TestApp::new();
    let tour = test_app.seed_tour("default", "cliffs-of-moher").await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/availability/{}?days=7", tour.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let days = body["data"]["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert!(days.iter().all(|day| day["status"] == "available"));
    assert_eq!(days[0]["level"], "high");
    assert_eq!(
        body["data"]["from"],
        days_from_today(0).to_string().as_str()
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/availability/{}", tour.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["days"].as_array().unwrap().len(), 180);

    let req = test::TestRequest::get()
        .uri(&format!("/api/availability/{}?optionId=nope", tour.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_availability_check_reports_reasons() {
    let test_app = TestApp::new();
    let tour = test_app.seed_tour("default", "cliffs-of-moher").await;
    let blocked = days_from_today(4);
    test_app
        .store
        .insert_stop_sale(&StopSale {
            id: "stop-1".to_string(),
            tenant_id: "default".to_string(),
            tour_id: tour.id.clone(),
            option_id: None,
            date: blocked,
            end_date: None,
            reason: Some("Coach maintenance".to_string()),
            created_at: None,
        })
        .await
        .unwrap();
    let app = test::init_service(test_app.create_app()).await;
    let uri = format!("/api/availability/{}/check", tour.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({
            "date": days_from_today(3),
            "timeSlot": "08:00",
            "guests": { "adults": 2, "children": 1 }
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["available"], true);

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({ "date": days_from_today(3), "timeSlot": "13:00" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["available"], false);
    assert_eq!(body["data"]["reason"], "sold_out");

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({ "date": blocked }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["reason"], "stop_sale");

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({ "date": days_from_today(-1) }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["reason"], "outside_window");

    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({
            "date": days_from_today(3),
            "guests": { "adults": 5, "children": 1, "infants": 1 }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_quote_prices_guests_and_add_ons() {
    let test_app = TestApp::new();
    let tour = test_app.seed_tour("default", "cliffs-of-moher").await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/quote")
        .set_json(json!({
            "tourId": tour.id,
            "guests": { "adults": 2, "children": 1 },
            "addOns": { "photos": 3, "lunch": 1 }
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let price = &body["data"];
    assert_eq!(price["subtotal"], 125.0);
    assert_eq!(price["addOnTotal"], 45.0);
    assert_eq!(price["total"], 170.0);

    let req = test::TestRequest::post()
        .uri("/api/quote")
        .set_json(json!({
            "tourId": tour.id,
            "optionId": "premium",
            "guests": { "adults": 1 }
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["unitPrice"], 80.0);
    assert_eq!(body["data"]["savings"], 15.0);

    let req = test::TestRequest::post()
        .uri("/api/quote")
        .set_json(json!({ "tourId": tour.id, "guests": { "adults": 0, "children": 2 } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_cart_item_requires_finalized_selection() {
    let test_app = TestApp::new();
    let tour = test_app.seed_tour("default", "cliffs-of-moher").await;
    let app = test::init_service(test_app.create_app()).await;
    let date = days_from_today(10);

    let req = test::TestRequest::post()
        .uri("/api/cart/items")
        .set_json(json!({
            "tourId": tour.id,
            "date": date,
            "timeSlot": "08:00",
            "guests": { "adults": 2 },
            "addOns": { "photos": 1 }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["data"]["uniqueId"],
        format!("{}|{}|08:00|photos:1", tour.id, date).as_str()
    );
    assert_eq!(body["data"]["price"]["total"], 115.0);
    assert_eq!(body["data"]["currency"], "EUR");

    let req = test::TestRequest::post()
        .uri("/api/cart/items")
        .set_json(json!({ "tourId": tour.id, "date": date, "guests": { "adults": 2 } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_malformed_json_uses_error_envelope() {
    let test_app = TestApp::new();
    let tour = test_app.seed_tour("default", "cliffs-of-moher").await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/quote")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Invalid JSON body"));

    let req = test::TestRequest::post()
        .uri("/api/checkout")
        .set_json(json!({ "customer": "nobody", "items": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let req = test::TestRequest::post()
        .uri(&format!("/api/availability/{}/check", tour.id))
        .set_json(json!({
            "date": days_from_today(3),
            "guests": { "adults": 4294967295u32, "children": 1 }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("maximum group size"));
}

#[actix_rt::test]
async fn test_oversized_json_body_uses_error_envelope() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/discounts/verify")
        .set_json(json!({ "code": "X".repeat(3 * 1024 * 1024), "subtotal": 10.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 413);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}
