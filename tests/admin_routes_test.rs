mod common;

use actix_web::test;
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use std::time::Duration;

use common::{days_from_today, tour_payload, TestApp};
use tourbook_api::db::store::Store;

async fn wait_for_destination(test_app: &TestApp, tour_id: &str, expected: Option<&str>) {
    for _ in 0..50 {
        let tour = test_app
            .store
            .get_tour("default", tour_id)
            .await
            .unwrap()
            .unwrap();
        if tour.destination.as_ref().map(|d| d.slug.as_str()) == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("destination of {} never became {:?}", tour_id, expected);
}

fn page_payload(slug: &str) -> Value {
    json!({
        "slug": slug,
        "title": "Cliffs of Moher",
        "hero": {
            "title": "Stand on the edge of Ireland",
            "image": "https://cdn.example.com/moher.jpg"
        },
        "sections": [
            { "heading": "Getting there", "body": "Coaches leave Galway at 08:00." }
        ],
        "faqs": [{ "question": "Is lunch included?", "answer": "On the premium option." }]
    })
}

#[actix_rt::test]
async fn test_tour_crud() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/tours")
        .set_json(tour_payload("cliffs-of-moher"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    let id = body["data"]["_id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["tenantId"], "default");

    let mut update = tour_payload("cliffs-of-moher");
    update["title"] = json!("Cliffs of Moher and the Burren");
    update["isPublished"] = json!(false);
    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/tours/{}", id))
        .set_json(&update)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["title"], "Cliffs of Moher and the Burren");

    let req = test::TestRequest::get().uri("/api/tours").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let req = test::TestRequest::get().uri("/api/admin/tours").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/tours/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri(&format!("/api/admin/tours/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
async fn test_tour_validation() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let mut payload = tour_payload("Cliffs Of Moher");
    let req = test::TestRequest::post()
        .uri("/api/admin/tours")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    payload["slug"] = json!("cliffs-of-moher");
    payload["maxGroupSize"] = json!(0);
    let req = test::TestRequest::post()
        .uri("/api/admin/tours")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_destination_sync_attaches_and_detaches_tours() {
    let test_app = TestApp::new();
    let first = test_app.seed_tour("default", "cliffs-of-moher").await;
    let second = test_app.seed_tour("default", "aran-islands").await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/destinations")
        .set_json(json!({
            "name": "County Clare",
            "slug": "county-clare",
            "country": "Ireland",
            "heroImage": "https://cdn.example.com/clare.jpg",
            "tourIds": [first.id, second.id]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    let destination_id = body["data"]["_id"].as_str().unwrap().to_string();

    wait_for_destination(&test_app, &first.id, Some("county-clare")).await;
    wait_for_destination(&test_app, &second.id, Some("county-clare")).await;

    let req = test::TestRequest::get()
        .uri("/api/tours?destination=county-clare")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/destinations/{}", destination_id))
        .set_json(json!({
            "name": "County Clare",
            "slug": "county-clare",
            "tourIds": [second.id]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    wait_for_destination(&test_app, &first.id, None).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/destinations/{}", destination_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    wait_for_destination(&test_app, &second.id, None).await;
}

#[actix_rt::test]
async fn test_destination_slug_must_be_unique() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;
    let payload = json!({ "name": "Galway", "slug": "galway" });

    let req = test::TestRequest::post()
        .uri("/api/admin/destinations")
        .set_json(&payload)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let req = test::TestRequest::post()
        .uri("/api/admin/destinations")
        .set_json(&payload)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);

    let req = test::TestRequest::post()
        .uri("/api/admin/destinations")
        .set_json(json!({ "name": "Cork", "slug": "cork", "heroImage": "not a url" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_rt::test]
async fn test_attraction_page_lifecycle() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/attraction-pages")
        .set_json(page_payload("cliffs-of-moher"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "draft");
    let id = body["data"]["_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/attractions/cliffs-of-moher")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    let req = test::TestRequest::post()
        .uri(&format!("/api/admin/attraction-pages/{}/publish", id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "published");

    let req = test::TestRequest::get()
        .uri("/api/attractions/cliffs-of-moher")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["hero"]["title"], "Stand on the edge of Ireland");
    assert_eq!(body["data"]["faqs"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::post()
        .uri("/api/admin/attraction-pages")
        .set_json(page_payload("cliffs-of-moher"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);

    let req = test::TestRequest::post()
        .uri(&format!("/api/admin/attraction-pages/{}/unpublish", id))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/attractions/cliffs-of-moher")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/attraction-pages/{}", id))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());
}

#[actix_rt::test]
async fn test_attraction_page_validation() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/attraction-pages")
        .set_json(page_payload("Cliffs_of_Moher"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let mut payload = page_payload("cliffs-of-moher");
    payload["sections"][0]["image"] = json!("javascript:alert(1)");
    let req = test::TestRequest::post()
        .uri("/api/admin/attraction-pages")
        .set_json(&payload)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_rt::test]
async fn test_stop_sales() {
    let test_app = TestApp::new();
    let tour = test_app.seed_tour("default", "cliffs-of-moher").await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/stop-sales")
        .set_json(json!({
            "tourId": tour.id,
            "optionId": "premium",
            "date": days_from_today(5),
            "endDate": days_from_today(6),
            "reason": "Restaurant closed"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    let id = body["data"]["_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/availability/{}?optionId=premium&days=7", tour.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let days = body["data"]["days"].as_array().unwrap();
    assert_eq!(days[4]["status"], "available");
    assert_eq!(days[5]["status"], "unavailable");
    assert_eq!(days[6]["status"], "unavailable");

    let req = test::TestRequest::get()
        .uri(&format!("/api/availability/{}?days=7", tour.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["days"][5]["status"], "available");

    let req = test::TestRequest::get()
        .uri(&format!("/api/admin/stop-sales?tourId={}", tour.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/stop-sales/{}", id))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::post()
        .uri("/api/admin/stop-sales")
        .set_json(json!({
            "tourId": tour.id,
            "date": days_from_today(6),
            "endDate": days_from_today(5)
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/admin/stop-sales")
        .set_json(json!({ "tourId": "missing", "date": days_from_today(1) }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_rt::test]
async fn test_discount_admin() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/discounts")
        .set_json(json!({ "code": " autumn10 ", "kind": "percentage", "value": 10 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["code"], "AUTUMN10");
    assert_eq!(body["data"]["active"], true);

    let req = test::TestRequest::post()
        .uri("/api/admin/discounts")
        .set_json(json!({ "code": "AUTUMN10", "kind": "fixed", "value": 5 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);

    let req = test::TestRequest::post()
        .uri("/api/admin/discounts")
        .set_json(json!({ "code": "HALFPLUS", "kind": "percentage", "value": 150 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::get().uri("/api/admin/discounts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_base64_upload() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/upload/base64")
        .set_json(json!({
            "data": "data:image/png;base64,iVBORw0KGgo=",
            "fileName": "pixel.png",
            "fileType": "image/png",
            "fileSize": 8,
            "folder": "attractions"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    let url = body["data"]["url"].as_str().unwrap();
    assert!(url.starts_with("https://storage.test/tourbook/default/attractions/"));
    assert!(url.ends_with(".png"));

    let objects = test_app.storage.objects.lock().await;
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].1.len(), 8);
    drop(objects);

    let req = test::TestRequest::post()
        .uri("/api/upload/base64")
        .set_json(json!({
            "data": "aGVsbG8=",
            "fileName": "notes.txt",
            "fileType": "text/plain",
            "fileSize": 5
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_rt::test]
async fn test_base64_upload_above_default_json_limit() {
    let test_app = TestApp::with_upload_limit(3 * 1024 * 1024);
    let app = test::init_service(test_app.create_app()).await;

    let image = vec![7u8; 2_400_000];
    let req = test::TestRequest::post()
        .uri("/api/upload/base64")
        .insert_header(("X-Tenant-Id", "acme"))
        .set_json(json!({
            "data": general_purpose::STANDARD.encode(&image),
            "fileName": "panorama.png",
            "fileType": "image/png",
            "fileSize": image.len()
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["size"], 2_400_000);
    assert!(body["data"]["objectName"]
        .as_str()
        .unwrap()
        .starts_with("acme/uploads/"));
}

#[actix_rt::test]
async fn test_base64_upload_limits_answer_with_envelope() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/upload/base64")
        .set_json(json!({
            "data": "A".repeat(20_000),
            "fileName": "huge.png",
            "fileType": "image/png",
            "fileSize": 15_000
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 413);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);

    let req = test::TestRequest::post()
        .uri("/api/upload/base64")
        .set_json(json!({
            "data": "aGVsbG8=",
            "fileName": "pixel.png",
            "fileType": "image/png",
            "fileSize": 9
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Declared file size"));

    let req = test::TestRequest::post()
        .uri("/api/upload/base64")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(test_app.storage.objects.lock().await.is_empty());
}

#[actix_rt::test]
async fn test_multipart_upload() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let boundary = "tourbook-boundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"folder\"\r\n\r\n\
         destinations\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"clare.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\n\
         jpegbytes\r\n\
         --{b}--\r\n",
        b = boundary
    );

    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["contentType"], "image/jpeg");
    assert_eq!(body["data"]["size"], 9);
    assert!(body["data"]["objectName"]
        .as_str()
        .unwrap()
        .starts_with("default/destinations/"));
}

#[actix_rt::test]
async fn test_upload_disabled_without_storage() {
    let test_app = TestApp::bare();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/upload/base64")
        .set_json(json!({
            "data": "iVBORw0KGgo=",
            "fileName": "pixel.png",
            "fileType": "image/png",
            "fileSize": 8
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 503);
}
