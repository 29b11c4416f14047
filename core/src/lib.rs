//! Async API client for the car spa booking service.
//!
//! # Overview
//! Register, log in, browse services, book time slots, manage bookings and
//! submit payment proof against the booking backend's REST API. Every
//! operation returns `Result<T, ApiError>` with one of four error kinds.
//!
//! # Design
//! - `CarSpaClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without I/O, one `build_*`/`parse_*` pair per endpoint.
//! - A `Transport` performs the round-trip (`ReqwestTransport`, optionally
//!   wrapped in `LoggingTransport`).
//! - `ApiRepository` ties both together with the injected `Session` that
//!   holds the bearer token.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod proof;
pub mod repository;
pub mod session;
pub mod state;
pub mod transport;
pub mod types;
pub mod validation;

pub use client::CarSpaClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use repository::ApiRepository;
pub use session::Session;
pub use state::{ErrorNotice, LoadState, NoticeAction};
pub use transport::{LoggingTransport, ReqwestTransport, Transport};
pub use types::{
    AuthResponse, Booking, BookingStatus, CreateBooking, CreatePayment, Credentials, Payment,
    PaymentMethod, PaymentStatus, RegisterUser, Role, Service, UpdateBooking, User,
};
