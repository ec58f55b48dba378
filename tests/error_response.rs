use axum::{
    body::to_bytes,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use zing_bites_api::error::AppError;

async fn render(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let body = serde_json::from_slice(&bytes).expect("json body");
    (status, body)
}

#[tokio::test]
async fn domain_errors_keep_their_message() {
    let cases = [
        (AppError::not_found("Order not found."), StatusCode::NOT_FOUND),
        (AppError::bad_request("Invalid status."), StatusCode::BAD_REQUEST),
        (AppError::forbidden("nope"), StatusCode::FORBIDDEN),
        (
            AppError::unauthorized("Please login to access this resource"),
            StatusCode::UNAUTHORIZED,
        ),
    ];

    for (err, expected) in cases {
        let message = err.to_string();
        let (status, body) = render(err).await;
        assert_eq!(status, expected);
        assert_eq!(body["success"], Value::Bool(false));
        assert_eq!(body["message"], Value::String(message));
    }
}

#[tokio::test]
async fn missing_rows_become_not_found() {
    let (status, body) = render(AppError::DbError(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], Value::Bool(false));

    let (status, _) = render(AppError::OrmError(sea_orm::DbErr::RecordNotFound(
        "Dish not found".into(),
    )))
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn internal_failures_hide_their_cause() {
    let (status, body) = render(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], Value::String("Internal Server Error".into()));
}
