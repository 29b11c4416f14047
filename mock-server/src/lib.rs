use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const SLOTS: [(&str, usize); 6] = [
    ("08:00", 0),
    ("09:00", 1),
    ("10:00", 2),
    ("13:00", 3),
    ("14:00", 4),
    ("15:00", 5),
];

const BOOKING_STATUSES: [&str; 4] = ["waiting", "pending", "completed", "cancelled"];
const PAYMENT_METHODS: [&str; 3] = ["QR Code", "Credit Card", "Cash"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration: Option<u32>,
    pub time_0800: bool,
    pub time_0900: bool,
    pub time_1000: bool,
    pub time_1300: bool,
    pub time_1400: bool,
    pub time_1500: bool,
    pub created_at: DateTime<Utc>,
}

impl Service {
    fn slot_flags(&self) -> [bool; 6] {
        [
            self.time_0800,
            self.time_0900,
            self.time_1000,
            self.time_1300,
            self.time_1400,
            self.time_1500,
        ]
    }

    pub fn open_times(&self) -> Vec<String> {
        let flags = self.slot_flags();
        SLOTS
            .iter()
            .filter(|(_, i)| flags[*i])
            .map(|(t, _)| t.to_string())
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub service_id: i64,
    pub date: String,
    pub time: String,
    pub status: String,
    pub payment_id: Option<i64>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub note: Option<String>,
    pub service_name: Option<String>,
    pub price: Option<f64>,
    pub amount: Option<f64>,
    pub payment_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub booking_id: i64,
    pub amount: f64,
    pub status: String,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub qr_code: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateBookingInput {
    pub service_id: i64,
    pub date: Option<String>,
    pub time: String,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateBookingInput {
    pub status: String,
}

#[derive(Deserialize)]
pub struct CreatePaymentInput {
    pub booking_id: i64,
    pub amount: f64,
    pub payment_method: String,
    pub qr_code: Option<String>,
    pub image: Option<String>,
}

/// Errors rendered the way the booking backend renders them: validation
/// failures as `{"errors":[{"msg":..}]}`, everything else as `{"error":..}`.
#[derive(Debug)]
pub enum ServerError {
    Validation(Vec<String>),
    Unauthorized(&'static str),
    NotFound(&'static str),
    Conflict(&'static str),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::Validation(msgs) => {
                let errors: Vec<_> = msgs.into_iter().map(|msg| json!({ "msg": msg })).collect();
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ServerError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg }))).into_response()
            }
            ServerError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response()
            }
            ServerError::Conflict(msg) => {
                (StatusCode::CONFLICT, Json(json!({ "error": msg }))).into_response()
            }
        }
    }
}

struct Account {
    user: User,
    password: String,
}

pub struct Store {
    accounts: Vec<Account>,
    tokens: HashMap<String, i64>,
    services: Vec<Service>,
    bookings: Vec<Booking>,
    payments: Vec<Payment>,
    next_id: i64,
}

impl Store {
    fn seeded() -> Self {
        let now = Utc::now();
        let service = |id, name: &str, description: &str, price, duration, flags: [bool; 6]| Service {
            id,
            name: name.to_string(),
            description: Some(description.to_string()),
            price,
            duration: Some(duration),
            time_0800: flags[0],
            time_0900: flags[1],
            time_1000: flags[2],
            time_1300: flags[3],
            time_1400: flags[4],
            time_1500: flags[5],
            created_at: now,
        };
        Self {
            accounts: Vec::new(),
            tokens: HashMap::new(),
            services: vec![
                service(1, "Basic Wash", "Exterior wash and dry", 150.0, 30, [true, true, true, true, false, false]),
                service(2, "Full Detail", "Wash, clay, polish and wax", 900.0, 120, [false, true, false, true, false, false]),
                service(3, "Interior Clean", "Vacuum and upholstery shampoo", 350.0, 60, [true; 6]),
            ],
            bookings: Vec::new(),
            payments: Vec::new(),
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn user(&self, id: i64) -> Option<&User> {
        self.accounts.iter().map(|a| &a.user).find(|u| u.id == id)
    }

    fn issue_token(&mut self, user_id: i64) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.insert(token.clone(), user_id);
        token
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/users/me", get(current_user))
        .route("/api/services", get(list_services))
        .route("/api/services/{id}/times", get(available_times))
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route("/api/bookings/{id}", get(get_booking).patch(update_booking))
        .route("/api/payments", post(create_payment))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Resolve the caller from an `Authorization: Bearer <token>` header.
fn authenticate(store: &Store, headers: &HeaderMap) -> Result<i64, ServerError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ServerError::Unauthorized("Missing bearer token"))?;
    store
        .tokens
        .get(token)
        .copied()
        .ok_or(ServerError::Unauthorized("Invalid or expired token"))
}

fn with_token(user: &User, token: String) -> serde_json::Value {
    let mut body = json!(user);
    body["token"] = json!(token);
    body
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServerError> {
    let mut errors = Vec::new();
    if input.username.trim().is_empty() {
        errors.push("Username is required".to_string());
    }
    if input.password.is_empty() {
        errors.push("Password is required".to_string());
    }
    if input.email.trim().is_empty() {
        errors.push("Email is required".to_string());
    }
    if !errors.is_empty() {
        return Err(ServerError::Validation(errors));
    }

    let mut store = db.write().await;
    if store
        .accounts
        .iter()
        .any(|a| a.user.username == input.username || a.user.email == input.email)
    {
        return Err(ServerError::Conflict("Username or email already exists"));
    }
    let user = User {
        id: store.next_id(),
        username: input.username,
        email: input.email,
        role: "customer".to_string(),
        first_name: input.first_name,
        last_name: input.last_name,
        phone: input.phone,
        created_at: Utc::now(),
    };
    let token = store.issue_token(user.id);
    let body = with_token(&user, token);
    store.accounts.push(Account {
        user,
        password: input.password,
    });
    Ok((StatusCode::CREATED, Json(body)))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginInput>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let mut store = db.write().await;
    let user = store
        .accounts
        .iter()
        .find(|a| a.user.username == input.username && a.password == input.password)
        .map(|a| a.user.clone())
        .ok_or(ServerError::Unauthorized("Invalid credentials"))?;
    let token = store.issue_token(user.id);
    Ok(Json(with_token(&user, token)))
}

async fn current_user(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<User>, ServerError> {
    let store = db.read().await;
    let user_id = authenticate(&store, &headers)?;
    store
        .user(user_id)
        .cloned()
        .map(Json)
        .ok_or(ServerError::NotFound("User not found"))
}

async fn list_services(State(db): State<Db>) -> Json<Vec<Service>> {
    Json(db.read().await.services.clone())
}

async fn available_times(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<String>>, ServerError> {
    let store = db.read().await;
    store
        .services
        .iter()
        .find(|s| s.id == id)
        .map(|s| Json(s.open_times()))
        .ok_or(ServerError::NotFound("Service not found"))
}

async fn list_bookings(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, ServerError> {
    let store = db.read().await;
    let user_id = authenticate(&store, &headers)?;
    Ok(Json(
        store
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect(),
    ))
}

async fn get_booking(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, ServerError> {
    let store = db.read().await;
    let user_id = authenticate(&store, &headers)?;
    store
        .bookings
        .iter()
        .find(|b| b.id == id && b.user_id == user_id)
        .cloned()
        .map(Json)
        .ok_or(ServerError::NotFound("Booking not found"))
}

async fn create_booking(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateBookingInput>,
) -> Result<(StatusCode, Json<Booking>), ServerError> {
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    let service = store
        .services
        .iter()
        .find(|s| s.id == input.service_id)
        .cloned()
        .ok_or(ServerError::NotFound("Service not found"))?;
    if !service.open_times().contains(&input.time) {
        return Err(ServerError::Validation(vec![format!(
            "Time {} is not available for {}",
            input.time, service.name
        )]));
    }
    let booking = Booking {
        id: store.next_id(),
        user_id,
        service_id: service.id,
        date: input
            .date
            .unwrap_or_else(|| Utc::now().date_naive().to_string()),
        time: input.time,
        status: "waiting".to_string(),
        payment_id: None,
        payment_status: None,
        payment_method: None,
        note: input.note,
        service_name: Some(service.name),
        price: Some(service.price),
        amount: None,
        payment_image: None,
        created_at: Utc::now(),
    };
    store.bookings.push(booking.clone());
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn update_booking(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<UpdateBookingInput>,
) -> Result<Json<Booking>, ServerError> {
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    if !BOOKING_STATUSES.contains(&input.status.as_str()) {
        return Err(ServerError::Validation(vec![format!(
            "Invalid status: {}",
            input.status
        )]));
    }
    let booking = store
        .bookings
        .iter_mut()
        .find(|b| b.id == id && b.user_id == user_id)
        .ok_or(ServerError::NotFound("Booking not found"))?;
    booking.status = input.status;
    Ok(Json(booking.clone()))
}

async fn create_payment(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreatePaymentInput>,
) -> Result<(StatusCode, Json<Payment>), ServerError> {
    let mut store = db.write().await;
    let user_id = authenticate(&store, &headers)?;
    if !PAYMENT_METHODS.contains(&input.payment_method.as_str()) {
        return Err(ServerError::Validation(vec![format!(
            "Invalid payment method: {}",
            input.payment_method
        )]));
    }
    if !store
        .bookings
        .iter()
        .any(|b| b.id == input.booking_id && b.user_id == user_id)
    {
        return Err(ServerError::NotFound("Booking not found"));
    }

    let payment = Payment {
        id: store.next_id(),
        booking_id: input.booking_id,
        amount: input.amount,
        status: "pending".to_string(),
        payment_method: input.payment_method,
        transaction_id: Some(Uuid::new_v4().simple().to_string()),
        qr_code: input.qr_code,
        image: input.image,
        created_at: Utc::now(),
    };
    if let Some(booking) = store
        .bookings
        .iter_mut()
        .find(|b| b.id == payment.booking_id)
    {
        booking.status = "pending".to_string();
        booking.payment_id = Some(payment.id);
        booking.payment_status = Some(payment.status.clone());
        booking.payment_method = Some(payment.payment_method.clone());
        booking.amount = Some(payment.amount);
        booking.payment_image = payment.image.clone();
    }
    store.payments.push(payment.clone());
    Ok((StatusCode::CREATED, Json(payment)))
}
