mod common;

use actix_web::test;
use serde_json::json;
use serial_test::serial;

use common::TestApp;

fn momo_return_body() -> serde_json::Value {
    json!({
        "partnerCode": "MOMOTEST",
        "orderId": "MOMOTEST-1234",
        "requestId": "req-1",
        "amount": "900000",
        "orderInfo": "vivu booking",
        "orderType": "momo_wallet",
        "transId": "4088878653",
        "resultCode": "0",
        "message": "Successful.",
        "payType": "qr",
        "responseTime": "1700000000000",
        "extraData": "e30=",
        "signature": "deadbeef"
    })
}

#[actix_rt::test]
#[serial]
async fn test_momo_return_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/checkout/tour/return/momo")
        .set_json(&momo_return_body())
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_zalopay_return_without_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/checkout/flight/return/zalopay")
        .set_json(&json!({
            "appid": "2553",
            "apptransid": "250807_482913",
            "pmcid": "38",
            "bankcode": "",
            "amount": "900000",
            "discountamount": "0",
            "status": "1",
            "checksum": "deadbeef"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_return_rejects_wrong_methods() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/checkout/tour/return/momo")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}
