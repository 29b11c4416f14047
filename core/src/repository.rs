//! Async facade over the booking API.
//!
//! # Design
//! `ApiRepository` is the single choke point for network calls. It pairs the
//! sans-IO `CarSpaClient` with a `Transport` and the shared `Session`:
//!
//! - unauthenticated operations build, send and parse;
//! - authenticated operations first read the session token and fail with
//!   `ApiError::Auth` without touching the transport when it is missing;
//! - login and register store the returned token, logout clears it.
//!
//! Every failure is surfaced once as an `ApiError`; there are no retries.

use std::future::Future;
use std::sync::Arc;

use crate::client::CarSpaClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::proof;
use crate::session::Session;
use crate::transport::{LoggingTransport, ReqwestTransport, Transport};
use crate::types::{
    Booking, BookingStatus, CreateBooking, CreatePayment, Credentials, Payment, PaymentMethod,
    RegisterUser, Service, UpdateBooking, User,
};

#[derive(Clone)]
pub struct ApiRepository {
    client: CarSpaClient,
    session: Session,
    transport: Arc<dyn Transport>,
}

impl ApiRepository {
    pub fn new(base_url: &str, session: Session, transport: Arc<dyn Transport>) -> Self {
        Self {
            client: CarSpaClient::new(base_url),
            session,
            transport,
        }
    }

    /// Repository over a logging `reqwest` transport.
    pub fn from_config(config: &ClientConfig, session: Session) -> Result<Self, ApiError> {
        let transport = LoggingTransport::new(ReqwestTransport::new(&config.user_agent)?);
        Ok(Self::new(&config.base_url, session, Arc::new(transport)))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client(&self) -> &CarSpaClient {
        &self.client
    }

    pub async fn register(&self, input: &RegisterUser) -> Result<User, ApiError> {
        traced("register", async {
            let request = self.client.build_register(input)?;
            let auth = self.client.parse_auth(self.send(request).await?)?;
            self.session.set(auth.token);
            tracing::info!(user_id = auth.user.id, username = %auth.user.username, "registered");
            Ok(auth.user)
        })
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        traced("login", async {
            let credentials = Credentials {
                username: username.to_string(),
                password: password.to_string(),
            };
            let request = self.client.build_login(&credentials)?;
            let auth = self.client.parse_auth(self.send(request).await?)?;
            self.session.set(auth.token);
            tracing::info!(user_id = auth.user.id, username = %auth.user.username, "logged in");
            Ok(auth.user)
        })
        .await
    }

    /// Forget the session token. Later authenticated calls fail with `Auth`.
    pub fn logout(&self) {
        self.session.clear();
        tracing::info!("logged out");
    }

    pub async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        traced("list_services", async {
            let response = self.send(self.client.build_list_services()).await?;
            self.client.parse_list_services(response)
        })
        .await
    }

    pub async fn list_available_times(&self, service_id: i64) -> Result<Vec<String>, ApiError> {
        traced("list_available_times", async {
            let response = self
                .send(self.client.build_available_times(service_id))
                .await?;
            self.client.parse_available_times(response)
        })
        .await
    }

    pub async fn list_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        traced("list_bookings", async {
            let token = self.token()?;
            let response = self.send(self.client.build_list_bookings(&token)).await?;
            self.client.parse_list_bookings(response)
        })
        .await
    }

    pub async fn get_booking(&self, id: i64) -> Result<Booking, ApiError> {
        traced("get_booking", async {
            let token = self.token()?;
            let response = self.send(self.client.build_get_booking(&token, id)).await?;
            self.client.parse_booking(response)
        })
        .await
    }

    pub async fn create_booking(&self, input: &CreateBooking) -> Result<Booking, ApiError> {
        traced("create_booking", async {
            let token = self.token()?;
            let request = self.client.build_create_booking(&token, input)?;
            let booking = self.client.parse_booking(self.send(request).await?)?;
            tracing::info!(booking_id = booking.id, service_id = booking.service_id, "booking created");
            Ok(booking)
        })
        .await
    }

    pub async fn update_booking(&self, id: i64, status: BookingStatus) -> Result<Booking, ApiError> {
        traced("update_booking", async {
            let token = self.token()?;
            let request = self
                .client
                .build_update_booking(&token, id, &UpdateBooking { status })?;
            self.client.parse_booking(self.send(request).await?)
        })
        .await
    }

    pub async fn create_payment(&self, input: &CreatePayment) -> Result<Payment, ApiError> {
        traced("create_payment", async {
            let token = self.token()?;
            let request = self.client.build_create_payment(&token, input)?;
            let payment = self.client.parse_payment(self.send(request).await?)?;
            tracing::info!(payment_id = payment.id, booking_id = payment.booking_id, "payment submitted");
            Ok(payment)
        })
        .await
    }

    /// Encode `image` as base64 on the blocking pool, then submit it as the
    /// payment proof.
    pub async fn create_payment_with_proof(
        &self,
        booking_id: i64,
        amount: f64,
        payment_method: PaymentMethod,
        image: Vec<u8>,
    ) -> Result<Payment, ApiError> {
        traced("create_payment_with_proof", async {
            self.token()?;
            let encoded = proof::encode_image_off_thread(image).await?;
            let input = CreatePayment::new(booking_id, amount, payment_method).with_image(encoded);
            self.create_payment(&input).await
        })
        .await
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        traced("current_user", async {
            let token = self.token()?;
            let response = self.send(self.client.build_current_user(&token)).await?;
            self.client.parse_user(response)
        })
        .await
    }

    fn token(&self) -> Result<String, ApiError> {
        self.session.get().ok_or_else(ApiError::missing_token)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.execute(request).await
    }
}

async fn traced<T>(
    operation: &'static str,
    call: impl Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    tracing::debug!(operation, "api call");
    let result = call.await;
    if let Err(e) = &result {
        tracing::warn!(operation, kind = e.kind(), error = %e, "api call failed");
    }
    result
}
