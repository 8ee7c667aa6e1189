use actix_web::{
    body::MessageBody,
    http::{header::ContentType, StatusCode},
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use log::debug;

use crate::auth::USER_ID_HEADER;

/// Sends `req` to a fresh app built by `configure` and returns the status and body.
///
/// `user_id` is sent in the identity header unless it is empty.
pub async fn send_request(
    mut req: TestRequest,
    user_id: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    if !user_id.is_empty() {
        req = req.insert_header((USER_ID_HEADER, user_id));
    }
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req.to_request()).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = res.into_body().try_into_bytes().map_err(|_| "Could not read response body".to_string())?;
    Ok((status, String::from_utf8_lossy(&body).into_owned()))
}

pub async fn get_request(
    user_id: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::get().uri(path), user_id, configure).await
}

pub async fn post_text(
    user_id: &str,
    path: &str,
    body: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::post().uri(path).insert_header(ContentType::plaintext()).set_payload(body.to_string());
    send_request(req, user_id, configure).await
}

pub async fn post_json(
    user_id: &str,
    path: &str,
    body: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::post().uri(path).insert_header(ContentType::json()).set_payload(body.to_string());
    send_request(req, user_id, configure).await
}
