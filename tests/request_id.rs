use axum::http::Request;
use zing_bites_api::middleware::request_id::{REQUEST_ID_HEADER, request_id_of};

#[test]
fn request_id_is_read_from_the_header() {
    let request = Request::builder()
        .uri("/api/v1/orders")
        .header(REQUEST_ID_HEADER, "6f1c2b9e-req")
        .body(())
        .unwrap();
    assert_eq!(request_id_of(&request), "6f1c2b9e-req");
}

#[test]
fn missing_request_id_reads_as_dash() {
    let request = Request::builder().uri("/health").body(()).unwrap();
    assert_eq!(request_id_of(&request), "-");
}
