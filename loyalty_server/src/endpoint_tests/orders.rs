use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use loyalty_common::Points;
use loyalty_engine::{
    db_types::{Order, OrderNumber, OrderStatusType},
    traits::InsertOrderResult,
    OrderApi,
};

use super::helpers::{get_request, post_text};
use crate::{
    endpoint_tests::mocks::MockOrderManager,
    routes::{MyOrdersRoute, RegisterOrderRoute},
};

#[actix_web::test]
async fn register_new_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_text("1", "/orders", "79927398713", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn register_order_ignores_surrounding_whitespace() {
    let _ = env_logger::try_init().ok();
    let (status, _) = post_text("1", "/orders", "  79927398713\n", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[actix_web::test]
async fn register_own_order_twice() {
    let _ = env_logger::try_init().ok();
    let (status, _) = post_text("1", "/orders", "12345678903", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn register_another_users_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_text("1", "/orders", "4561261212345467", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"Order #4561261212345467 has already been registered by another user"}"#);
}

#[actix_web::test]
async fn register_order_with_bad_check_digit() {
    let _ = env_logger::try_init().ok();
    let (status, _) = post_text("1", "/orders", "79927398710", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = post_text("1", "/orders", "7992-7398-713", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn register_empty_order() {
    let _ = env_logger::try_init().ok();
    let (status, _) = post_text("1", "/orders", "   ", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn register_order_without_identity() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_text("", "/orders", "79927398713", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. The X-Loyalty-User-Id header is missing."}"#);
    let (status, _) = post_text("bob", "/orders", "79927398713", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("1", "/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDERS_JSON);
}

#[actix_web::test]
async fn fetch_my_orders_when_there_are_none() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("2", "/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn fetch_my_orders_without_identity() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request("", "/orders", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

fn configure(cfg: &mut ServiceConfig) {
    let mut order_manager = MockOrderManager::new();
    order_manager.expect_insert_order().returning(|user_id, number| {
        let result = match number.as_str() {
            "12345678903" => InsertOrderResult::AlreadyExists(order(2, "12345678903", 1, OrderStatusType::New, None)),
            "4561261212345467" => {
                InsertOrderResult::AlreadyExists(order(3, "4561261212345467", 2, OrderStatusType::Processing, None))
            },
            n => InsertOrderResult::Inserted(order(4, n, user_id, OrderStatusType::New, None)),
        };
        Ok(result)
    });
    order_manager
        .expect_fetch_orders_for_user()
        .returning(|user_id| Ok(if user_id == 1 { orders_response() } else { vec![] }));
    let orders_api = OrderApi::new(order_manager);
    cfg.service(RegisterOrderRoute::<MockOrderManager>::new())
        .service(MyOrdersRoute::<MockOrderManager>::new())
        .app_data(web::Data::new(orders_api));
}

fn order(id: i64, number: &str, user_id: i64, status: OrderStatusType, accrual: Option<Points>) -> Order {
    let created_at = Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap();
    Order { id, number: OrderNumber::from(number), user_id, status, accrual, created_at, updated_at: created_at }
}

// Mock response to `fetch_orders_for_user`, newest first
fn orders_response() -> Vec<Order> {
    let mut processed = order(1, "79927398713", 1, OrderStatusType::Processed, Some(Points::from_points(500)));
    processed.created_at = Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap();
    vec![order(2, "12345678903", 1, OrderStatusType::New, None), processed]
}

const ORDERS_JSON: &str = r#"[{"number":"12345678903","status":"NEW","uploaded_at":"2024-03-15T18:30:00Z"},{"number":"79927398713","status":"PROCESSED","accrual":500,"uploaded_at":"2024-02-29T13:30:00Z"}]"#;
