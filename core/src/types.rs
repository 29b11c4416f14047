//! Domain DTOs for the car spa booking API.
//!
//! # Design
//! Field names match the server's snake_case JSON, so serde needs no
//! renames apart from the enum values. These types are defined
//! independently from the mock-server crate; integration tests catch schema
//! drift between the two.
//!
//! Bookings carry separate `date` and `time` fields. Available times come
//! from the dedicated `/times` endpoint; the per-slot flags on `Service` are
//! kept as data only.
//!
//! Response types tolerate server drift: enum values outside the known set
//! land in an `Other` variant and timestamps in an unexpected format read as
//! `None`, so one odd record never fails a whole list.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Role of an account on the booking platform.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Staff,
    Owner,
    #[serde(other)]
    Other,
}

/// A user account as returned by the API. Passwords never appear here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body returned by login and register: the user plus a fresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

/// Login payload.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(custom(function = "crate::validation::required", message = "Username is required"))]
    pub username: String,
    #[validate(custom(function = "crate::validation::required", message = "Password is required"))]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Registration payload. A blank required field reports only that it is
/// missing; otherwise the field's other rules apply.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(
        custom(function = "crate::validation::required", message = "Username is required"),
        length(min = 3, message = "Username must be at least 3 characters")
    )]
    pub username: String,
    #[validate(
        custom(function = "crate::validation::required", message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,
    #[validate(
        custom(function = "crate::validation::required", message = "Email is required"),
        email(message = "Valid email is required")
    )]
    pub email: String,
    #[validate(custom(function = "crate::validation::required", message = "First name is required"))]
    pub first_name: String,
    #[validate(custom(function = "crate::validation::required", message = "Last name is required"))]
    pub last_name: String,
    #[validate(custom(function = "crate::validation::validate_phone"))]
    pub phone: String,
}

impl fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterUser")
            .field("username", &self.username)
            .field("password", &"***")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("phone", &self.phone)
            .finish()
    }
}

/// Fixed time-of-day slots a service can be flagged for, in display order.
pub const SLOT_TIMES: [&str; 6] = ["08:00", "09:00", "10:00", "13:00", "14:00", "15:00"];

/// A bookable service (wash, polish, interior clean, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    /// Minutes.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub time_0800: Option<bool>,
    #[serde(default)]
    pub time_0900: Option<bool>,
    #[serde(default)]
    pub time_1000: Option<bool>,
    #[serde(default)]
    pub time_1300: Option<bool>,
    #[serde(default)]
    pub time_1400: Option<bool>,
    #[serde(default)]
    pub time_1500: Option<bool>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Service {
    /// Expand the per-slot flags into `"HH:MM"` strings. Unset flags count
    /// as unavailable.
    pub fn flagged_times(&self) -> Vec<String> {
        let flags = [
            self.time_0800,
            self.time_0900,
            self.time_1000,
            self.time_1300,
            self.time_1400,
            self.time_1500,
        ];
        SLOT_TIMES
            .iter()
            .zip(flags)
            .filter(|(_, flag)| *flag == Some(true))
            .map(|(time, _)| time.to_string())
            .collect()
    }
}

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Waiting,
    Pending,
    Completed,
    Cancelled,
    #[serde(other)]
    Other,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "waiting",
            BookingStatus::Pending => "pending",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Other => "other",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booking of one service by one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub service_id: i64,
    pub date: String,
    pub time: String,
    pub status: BookingStatus,
    #[serde(default)]
    pub payment_id: Option<i64>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub payment_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request payload for creating a booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateBooking {
    pub service_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CreateBooking {
    pub fn new(service_id: i64, time: impl Into<String>) -> Self {
        Self {
            service_id,
            date: None,
            time: time.into(),
            note: None,
        }
    }

    /// Book for a specific `YYYY-MM-DD` date instead of the server default.
    pub fn on_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Request payload for changing a booking's status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateBooking {
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    #[serde(rename = "QR Code")]
    QrCode,
    #[serde(rename = "Credit Card")]
    CreditCard,
    Cash,
    #[serde(other)]
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::QrCode => "QR Code",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Other => "Other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment submitted against a booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: i64,
    pub booking_id: i64,
    pub amount: f64,
    pub status: PaymentStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub qr_code: Option<String>,
    /// Base64 proof image or a server-hosted path.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request payload for creating a payment. `image` holds the base64-encoded
/// proof; there is no multipart upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatePayment {
    pub booking_id: i64,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CreatePayment {
    pub fn new(booking_id: i64, amount: f64, payment_method: PaymentMethod) -> Self {
        Self {
            booking_id,
            amount,
            payment_method,
            qr_code: None,
            image: None,
        }
    }

    pub fn with_qr_code(mut self, qr_code: impl Into<String>) -> Self {
        self.qr_code = Some(qr_code.into());
        self
    }

    pub fn with_image(mut self, image_base64: impl Into<String>) -> Self {
        self.image = Some(image_base64.into());
        self
    }
}

/// Parse an RFC 3339 timestamp, falling back to the SQL-style
/// `YYYY-MM-DD HH:MM:SS` form read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|naive| naive.and_utc())
        })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
