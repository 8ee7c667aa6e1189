use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use loyalty_common::Points;
use loyalty_engine::{
    db_types::{Balance, OrderNumber, Withdrawal},
    traits::WithdrawalError,
    BalanceApi,
};

use super::helpers::{get_request, post_json};
use crate::{
    endpoint_tests::mocks::MockBalanceManager,
    routes::{json_config, MyBalanceRoute, MyWithdrawalsRoute, WithdrawRoute},
};

#[actix_web::test]
async fn fetch_my_balance() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("1", "/balance", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"current":500.5,"withdrawn":42}"#);
}

#[actix_web::test]
async fn fetch_balance_of_new_user() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("2", "/balance", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"current":0,"withdrawn":0}"#);
}

#[actix_web::test]
async fn fetch_balance_without_identity() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request("", "/balance", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn withdraw_points() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_json("1", "/balance/withdraw", r#"{"order":"79927398713","sum":100}"#, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"order":"79927398713","sum":100,"processed_at":"2024-04-01T09:15:00Z"}"#);
}

#[actix_web::test]
async fn withdraw_more_than_the_balance() {
    let _ = env_logger::try_init().ok();
    let (status, _) = post_json("1", "/balance/withdraw", r#"{"order":"79927398713","sum":500.51}"#, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    let (status, _) = post_json("2", "/balance/withdraw", r#"{"order":"79927398713","sum":1}"#, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
}

#[actix_web::test]
async fn withdraw_loses_race_for_funds() {
    let _ = env_logger::try_init().ok();
    // The balance check passes, but the debit inside the store finds the funds gone
    let (status, body) = post_json("1", "/balance/withdraw", r#"{"order":"12345678903","sum":10}"#, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body, r#"{"error":"Insufficient funds. Requested 10.00, but only 5.00 is available"}"#);
}

#[actix_web::test]
async fn withdraw_twice_for_the_same_order() {
    let _ = env_logger::try_init().ok();
    let (status, _) = post_json("1", "/balance/withdraw", r#"{"order":"2377225624","sum":10}"#, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn withdraw_with_invalid_input() {
    let _ = env_logger::try_init().ok();
    for payload in [
        r#"{"order":"79927398710","sum":10}"#,
        r#"{"order":"abc","sum":10}"#,
        r#"{"order":"79927398713","sum":0}"#,
        r#"{"order":"79927398713","sum":-5}"#,
    ] {
        let (status, _) = post_json("1", "/balance/withdraw", payload, configure).await.expect("Request failed");
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{payload}");
    }
}

#[actix_web::test]
async fn withdraw_with_malformed_body() {
    let _ = env_logger::try_init().ok();
    for payload in [r#"{"order":"79927398713","sum":"10"}"#, r#"{"order":"79927398713"}"#, "not json"] {
        let (status, body) = post_json("1", "/balance/withdraw", payload, configure).await.expect("Request failed");
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert!(body.starts_with(r#"{"error":"Payload deserialization error."#), "{body}");
    }
}

#[actix_web::test]
async fn withdraw_with_a_non_numeric_sum() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_json("1", "/balance/withdraw", r#"{"order":"18","sum":"lots"}"#, configure)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body).expect("Error body is JSON");
    let message = body["error"].as_str().expect("error field is a string");
    assert!(message.starts_with("Payload deserialization error."), "{message}");
    assert!(message.contains("lots"), "{message}");
}

#[actix_web::test]
async fn fetch_my_withdrawals() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("1", "/withdrawals", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"[{"order":"79927398713","sum":42,"processed_at":"2024-04-01T09:15:00Z"}]"#);
    let (status, body) = get_request("2", "/withdrawals", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

fn configure(cfg: &mut ServiceConfig) {
    let mut balance_manager = MockBalanceManager::new();
    balance_manager.expect_fetch_balance().returning(|user_id| {
        Ok(match user_id {
            1 => Balance::new(Points::from_hundredths(50_050), Points::from_points(42)),
            _ => Balance::default(),
        })
    });
    balance_manager.expect_withdraw().returning(|user_id, number, sum| match number.as_str() {
        "12345678903" => Err(WithdrawalError::InsufficientFunds { requested: sum, available: Points::from_points(5) }),
        "2377225624" => Err(WithdrawalError::Conflict(number.clone())),
        _ => Ok(withdrawal(user_id, number.as_str(), sum)),
    });
    balance_manager.expect_fetch_withdrawals().returning(|user_id| {
        Ok(if user_id == 1 { vec![withdrawal(1, "79927398713", Points::from_points(42))] } else { vec![] })
    });
    let balance_api = BalanceApi::new(balance_manager);
    cfg.service(MyBalanceRoute::<MockBalanceManager>::new())
        .service(WithdrawRoute::<MockBalanceManager>::new())
        .service(MyWithdrawalsRoute::<MockBalanceManager>::new())
        .app_data(json_config())
        .app_data(web::Data::new(balance_api));
}

fn withdrawal(user_id: i64, number: &str, sum: Points) -> Withdrawal {
    Withdrawal {
        id: 1,
        user_id,
        order_number: OrderNumber::from(number),
        sum,
        created_at: Utc.with_ymd_and_hms(2024, 4, 1, 9, 15, 0).unwrap(),
    }
}
