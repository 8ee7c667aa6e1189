//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two should push their logic into the
//! engine's API objects. Keep this module neat and tidy 🙏
//!
//! Every handler is async. Anything that touches the database or the network is awaited, so a slow request never
//! blocks the worker thread it runs on.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use loyalty_engine::{
    traits::{BalanceManagement, OrderManagement},
    BalanceApi,
    OrderApi,
    RegisterOrderResult,
};

use crate::{
    auth::UserId,
    data_objects::{OrderResponse, WithdrawRequest, WithdrawalResponse},
    errors::{json_error_handler, ServerError},
};

/// JSON extractor settings shared by every route. Malformed bodies get a JSON error response.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(register_order => Post "/orders" impl OrderManagement);
/// Route handler for order registration
///
/// The request body is the bare order number as plain text. Surrounding whitespace is ignored.
/// * `202 Accepted`: the order is new and will be sent to the accrual authority.
/// * `200 OK`: the caller had already registered this order.
/// * `409 Conflict`: another user registered this order.
/// * `422 Unprocessable Entity`: the number fails the Luhn check.
/// * `400 Bad Request`: the body is empty.
pub async fn register_order<B: OrderManagement>(
    user: UserId,
    body: String,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST order '{}' for user {}", body.trim(), user.0);
    let result = api.register_order(user.0, &body).await.map_err(|e| {
        debug!("💻️ Could not register order for user {}. {e}", user.0);
        ServerError::from(e)
    })?;
    let response = match result {
        RegisterOrderResult::Accepted(_) => HttpResponse::Accepted().finish(),
        RegisterOrderResult::AlreadyRegistered(_) => HttpResponse::Ok().finish(),
    };
    Ok(response)
}

route!(my_orders => Get "/orders" impl OrderManagement);
/// Route handler for the orders endpoint
///
/// Returns the caller's orders, newest first, or `204 No Content` if they have not registered any.
pub async fn my_orders<B: OrderManagement>(
    user: UserId,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for user {}", user.0);
    let orders = api.orders_for_user(user.0).await?;
    if orders.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let orders = orders.into_iter().map(OrderResponse::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Balance  ----------------------------------------------------
route!(my_balance => Get "/balance" impl BalanceManagement);
/// Route handler for the balance endpoint
///
/// Users without any credited orders have a zero balance.
pub async fn my_balance<B: BalanceManagement>(
    user: UserId,
    api: web::Data<BalanceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_balance for user {}", user.0);
    let balance = api.balance(user.0).await?;
    Ok(HttpResponse::Ok().json(balance))
}

route!(withdraw => Post "/balance/withdraw" impl BalanceManagement);
/// Route handler for spending points
///
/// The body is a JSON object `{"order": "<number>", "sum": <points>}`.
/// * `200 OK`: the points were debited.
/// * `402 Payment Required`: the balance is too low.
/// * `422 Unprocessable Entity`: the order number fails the Luhn check, or the sum is not positive.
/// * `409 Conflict`: points were already spent on this order number.
pub async fn withdraw<B: BalanceManagement>(
    user: UserId,
    body: web::Json<WithdrawRequest>,
    api: web::Data<BalanceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let WithdrawRequest { order, sum } = body.into_inner();
    debug!("💻️ POST withdraw {sum} for order '{order}' by user {}", user.0);
    let withdrawal = api.withdraw(user.0, &order, sum).await.map_err(|e| {
        debug!("💻️ Withdrawal for user {} failed. {e}", user.0);
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(WithdrawalResponse::from(withdrawal)))
}

route!(my_withdrawals => Get "/withdrawals" impl BalanceManagement);
/// Route handler for the withdrawal history. `204 No Content` if the user has never spent any points.
pub async fn my_withdrawals<B: BalanceManagement>(
    user: UserId,
    api: web::Data<BalanceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_withdrawals for user {}", user.0);
    let withdrawals = api.withdrawals(user.0).await?;
    if withdrawals.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let withdrawals = withdrawals.into_iter().map(WithdrawalResponse::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(withdrawals))
}
