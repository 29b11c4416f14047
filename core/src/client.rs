//! Request builder and response parser for the car spa API.
//!
//! # Design
//! `CarSpaClient` holds only a `base_url`. Each endpoint is split into a
//! `build_*` method producing an `HttpRequest` and a `parse_*` method
//! consuming an `HttpResponse`; the round-trip itself belongs to a
//! `Transport`. Authenticated builders take the bearer token as an argument
//! so this type stays free of session state.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    AuthResponse, Booking, CreateBooking, CreatePayment, Credentials, Payment, RegisterUser,
    Service, UpdateBooking, User,
};

#[derive(Debug, Clone)]
pub struct CarSpaClient {
    base_url: String,
}

impl CarSpaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_register(&self, input: &RegisterUser) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/users/register", None, input)
    }

    pub fn build_login(&self, input: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/users/login", None, input)
    }

    pub fn build_list_services(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/services", None)
    }

    pub fn build_available_times(&self, service_id: i64) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &format!("/api/services/{service_id}/times"),
            None,
        )
    }

    pub fn build_list_bookings(&self, token: &str) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/bookings", Some(token))
    }

    pub fn build_get_booking(&self, token: &str, id: i64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/api/bookings/{id}"), Some(token))
    }

    pub fn build_create_booking(
        &self,
        token: &str,
        input: &CreateBooking,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/bookings", Some(token), input)
    }

    pub fn build_update_booking(
        &self,
        token: &str,
        id: i64,
        input: &UpdateBooking,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Patch,
            &format!("/api/bookings/{id}"),
            Some(token),
            input,
        )
    }

    pub fn build_create_payment(
        &self,
        token: &str,
        input: &CreatePayment,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/payments", Some(token), input)
    }

    pub fn build_current_user(&self, token: &str) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/users/me", Some(token))
    }

    /// Login and register share this response shape.
    pub fn parse_auth(&self, response: HttpResponse) -> Result<AuthResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_list_services(&self, response: HttpResponse) -> Result<Vec<Service>, ApiError> {
        parse_json(response)
    }

    pub fn parse_available_times(&self, response: HttpResponse) -> Result<Vec<String>, ApiError> {
        parse_json(response)
    }

    pub fn parse_list_bookings(&self, response: HttpResponse) -> Result<Vec<Booking>, ApiError> {
        parse_json(response)
    }

    /// Get, create and update all answer with a single booking.
    pub fn parse_booking(&self, response: HttpResponse) -> Result<Booking, ApiError> {
        parse_json(response)
    }

    pub fn parse_payment(&self, response: HttpResponse) -> Result<Payment, ApiError> {
        parse_json(response)
    }

    pub fn parse_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    fn request(&self, method: HttpMethod, path: &str, token: Option<&str>) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if let Some(token) = token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers,
            body: None,
        }
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body)
            .map_err(|e| ApiError::Unknown(format!("failed to serialize request: {e}")))?;
        let mut req = self.request(method, path, token);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }
}

/// Map a non-2xx response to `ApiError::Http`, keeping the status code,
/// the reason phrase and the raw body.
pub fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let reason = reqwest::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status");
    let body = if response.body.trim().is_empty() {
        "No error body"
    } else {
        response.body.as_str()
    };
    Err(ApiError::Http {
        status: response.status,
        message: format!("{reason} - {body}"),
    })
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Unknown(format!("failed to decode response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BookingStatus, PaymentMethod};

    fn client() -> CarSpaClient {
        CarSpaClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    const BOOKING_JSON: &str = r#"{"id":3,"user_id":1,"service_id":5,"date":"2025-06-01",
        "time":"09:00","status":"waiting","created_at":"2025-05-30T10:00:00Z"}"#;

    #[test]
    fn build_list_services_is_unauthenticated() {
        let req = client().build_list_services();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/services");
        assert!(req.header("authorization").is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn build_available_times_embeds_id() {
        let req = client().build_available_times(4);
        assert_eq!(req.url, "http://localhost:3000/api/services/4/times");
    }

    #[test]
    fn build_login_posts_credentials() {
        let req = client()
            .build_login(&Credentials {
                username: "alice".into(),
                password: "secret".into(),
            })
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/api/users/login");
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"username": "alice", "password": "secret"}));
    }

    #[test]
    fn build_register_uses_snake_case_fields() {
        let req = client()
            .build_register(&RegisterUser {
                username: "alice".into(),
                password: "secret1".into(),
                email: "alice@example.com".into(),
                first_name: "Alice".into(),
                last_name: "Liddell".into(),
                phone: "0812345678".into(),
            })
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/users/register");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["first_name"], "Alice");
        assert_eq!(body["last_name"], "Liddell");
    }

    #[test]
    fn authenticated_builders_attach_bearer() {
        let c = client();
        let requests = vec![
            c.build_list_bookings("abc"),
            c.build_get_booking("abc", 3),
            c.build_current_user("abc"),
            c.build_create_booking("abc", &CreateBooking::new(5, "09:00"))
                .unwrap(),
            c.build_update_booking(
                "abc",
                3,
                &UpdateBooking {
                    status: BookingStatus::Cancelled,
                },
            )
            .unwrap(),
            c.build_create_payment("abc", &CreatePayment::new(3, 150.0, PaymentMethod::Cash))
                .unwrap(),
        ];
        for req in requests {
            assert_eq!(req.header("authorization"), Some("Bearer abc"), "{}", req.url);
        }
    }

    #[test]
    fn build_update_booking_patches() {
        let req = client()
            .build_update_booking(
                "abc",
                3,
                &UpdateBooking {
                    status: BookingStatus::Cancelled,
                },
            )
            .unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url, "http://localhost:3000/api/bookings/3");
        assert_eq!(req.body.as_deref(), Some(r#"{"status":"cancelled"}"#));
    }

    #[test]
    fn build_create_payment_carries_image() {
        let input = CreatePayment::new(3, 150.0, PaymentMethod::QrCode).with_image("aGVsbG8=");
        let req = client().build_create_payment("abc", &input).unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/payments");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["booking_id"], 3);
        assert_eq!(body["payment_method"], "QR Code");
        assert_eq!(body["image"], "aGVsbG8=");
        assert!(body.get("qr_code").is_none());
    }

    #[test]
    fn parse_auth_success() {
        let auth = client()
            .parse_auth(response(200, r#"{"id":1,"username":"alice","token":"abc"}"#))
            .unwrap();
        assert_eq!(auth.user.id, 1);
        assert_eq!(auth.token, "abc");
    }

    #[test]
    fn parse_booking_accepts_created() {
        let booking = client().parse_booking(response(201, BOOKING_JSON)).unwrap();
        assert_eq!(booking.service_id, 5);
        assert_eq!(booking.date, "2025-06-01");
        assert_eq!(booking.time, "09:00");
        assert_eq!(booking.status, BookingStatus::Waiting);
    }

    #[test]
    fn parse_not_found_keeps_status() {
        let err = client()
            .parse_booking(response(404, r#"{"error":"Booking not found"}"#))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Http {
                status: 404,
                message: r#"Not Found - {"error":"Booking not found"}"#.to_string(),
            }
        );
    }

    #[test]
    fn parse_server_error_without_body() {
        let err = client().parse_list_services(response(500, "")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "HTTP 500: Internal Server Error - No error body"
        );
    }

    #[test]
    fn parse_bad_json_is_unknown() {
        let err = client()
            .parse_list_bookings(response(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Unknown(_)));
    }

    #[test]
    fn parse_available_times_list() {
        let times = client()
            .parse_available_times(response(200, r#"["08:00","13:00"]"#))
            .unwrap();
        assert_eq!(times, vec!["08:00", "13:00"]);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = CarSpaClient::new("http://10.0.2.2:3000/");
        assert_eq!(
            client.build_list_services().url,
            "http://10.0.2.2:3000/api/services"
        );
    }
}
