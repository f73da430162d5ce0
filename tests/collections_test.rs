mod common;

use axum::http::StatusCode;
use common::{Part, TestApp, body_json};
use serde_json::json;

#[tokio::test]
async fn test_collection_lifecycle() {
    let app = TestApp::new().await;

    let collection = app.create_collection("Holidays").await;
    assert_eq!(collection["name"], "Holidays");
    let id = collection["id"].as_i64().unwrap();

    // Freshly created: no images
    let response = app.get(&format!("/collections/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["name"], "Holidays");
    assert_eq!(fetched["images"], json!([]));

    let images = app
        .upload_ok(vec![
            Part::jpeg("beach.jpg"),
            Part::png("map.png"),
            Part::text("collectionId", id.to_string()),
        ])
        .await;
    assert!(images.iter().all(|i| i["collectionId"] == id));

    // An image outside the collection does not show up
    app.upload_ok(vec![Part::jpeg("other.jpg")]).await;

    let fetched = body_json(app.get(&format!("/collections/{}", id)).await).await;
    let names: Vec<&str> = fetched["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["filename"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["beach.jpg", "map.png"]);
}

#[tokio::test]
async fn test_list_collections() {
    let app = TestApp::new().await;
    assert_eq!(body_json(app.get("/collections").await).await, json!([]));

    app.create_collection("A").await;
    app.create_collection("B").await;
    // Names are not unique
    app.create_collection("A").await;

    let listed = body_json(app.get("/collections").await).await;
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A", "B", "A"]);
}

#[tokio::test]
async fn test_create_collection_validation() {
    let app = TestApp::new().await;

    let response = app.send_json("POST", "/collections", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Collection name not provided"
    );

    let response = app
        .send_json("POST", "/collections", json!({ "name": "   " }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send_json("POST", "/collections", json!({ "name": "x".repeat(256) }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(body_json(app.get("/collections").await).await, json!([]));
}

#[tokio::test]
async fn test_unknown_collection_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/collections/31").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Collection not found");
}

#[tokio::test]
async fn test_deleted_image_leaves_collection() {
    let app = TestApp::new().await;
    let collection = app.create_collection("Temp").await;
    let images = app
        .upload_ok(vec![
            Part::jpeg("a.jpg"),
            Part::text("collectionId", collection["id"].to_string()),
        ])
        .await;

    app.delete(&format!("/image/{}", images[0]["id"])).await;

    let fetched = body_json(app.get(&format!("/collections/{}", collection["id"])).await).await;
    assert_eq!(fetched["images"], json!([]));
}
