use tsank_storefront_api::routes::health::health_check;

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.0.message, "Storefront healthy");
    assert!(response.0.data.is_some());
}
