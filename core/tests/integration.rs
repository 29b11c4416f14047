//! Full booking flow against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every
//! `ApiRepository` operation over real HTTP through the logging reqwest
//! transport. Validates that request building, token handling and response
//! parsing agree with the server's schema.

use carspa_core::{
    ApiError, ApiRepository, BookingStatus, ClientConfig, CreateBooking, CreatePayment,
    PaymentMethod, PaymentStatus, RegisterUser, Session,
};

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

fn repository(base_url: &str) -> ApiRepository {
    let config = ClientConfig::default().with_base_url(base_url);
    ApiRepository::from_config(&config, Session::new()).unwrap()
}

fn alice() -> RegisterUser {
    RegisterUser {
        username: "alice".to_string(),
        password: "secret1".to_string(),
        email: "alice@example.com".to_string(),
        first_name: "Alice".to_string(),
        last_name: "Liddell".to_string(),
        phone: "0812345678".to_string(),
    }
}

#[tokio::test]
async fn booking_flow() {
    let base_url = start_server().await;
    let repo = repository(&base_url);

    // Step 1: authenticated calls fail locally before login.
    let err = repo.list_bookings().await.unwrap_err();
    assert_eq!(err, ApiError::missing_token());

    // Step 2: register stores a token.
    let input = alice();
    assert!(input.check_fields().is_ok());
    let user = repo.register(&input).await.unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.first_name.as_deref(), Some("Alice"));
    assert!(repo.session().is_authenticated());

    // Step 3: browse services and their open slots.
    let services = repo.list_services().await.unwrap();
    assert_eq!(services.len(), 3);
    let wash = &services[0];
    let times = repo.list_available_times(wash.id).await.unwrap();
    assert_eq!(times, wash.flagged_times());
    assert!(times.contains(&"09:00".to_string()));

    // Step 4: book a slot.
    let booking = repo
        .create_booking(
            &CreateBooking::new(wash.id, "09:00")
                .on_date("2025-06-01")
                .with_note("red hatchback"),
        )
        .await
        .unwrap();
    assert_eq!(booking.service_id, wash.id);
    assert_eq!(booking.user_id, user.id);
    assert_eq!(booking.date, "2025-06-01");
    assert_eq!(booking.status, BookingStatus::Waiting);

    // Step 5: list and fetch it back.
    let bookings = repo.list_bookings().await.unwrap();
    assert_eq!(bookings, vec![booking.clone()]);
    let fetched = repo.get_booking(booking.id).await.unwrap();
    assert_eq!(fetched, booking);

    // Step 6: pay with an uploaded proof image.
    let payment = repo
        .create_payment_with_proof(booking.id, wash.price, PaymentMethod::QrCode, b"jpeg".to_vec())
        .await
        .unwrap();
    assert_eq!(payment.booking_id, booking.id);
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.image.as_deref(), Some("anBlZw=="));

    let paid = repo.get_booking(booking.id).await.unwrap();
    assert_eq!(paid.payment_id, Some(payment.id));
    assert_eq!(paid.payment_method, Some(PaymentMethod::QrCode));
    assert_eq!(paid.status, BookingStatus::Pending);

    // Step 7: cancel.
    let cancelled = repo
        .update_booking(booking.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    // Step 8: current user matches the registered one.
    let me = repo.current_user().await.unwrap();
    assert_eq!(me.id, user.id);

    // Step 9: logout gates authenticated calls again.
    repo.logout();
    assert!(matches!(repo.current_user().await, Err(ApiError::Auth(_))));

    // Step 10: login restores access.
    let again = repo.login("alice", "secret1").await.unwrap();
    assert_eq!(again.id, user.id);
    assert_eq!(repo.list_bookings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn server_rejections_keep_status() {
    let base_url = start_server().await;
    let repo = repository(&base_url);

    let err = repo.login("nobody", "whatever").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(!repo.session().is_authenticated());

    let err = repo.list_available_times(99).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    repo.register(&alice()).await.unwrap();
    let err = repo.get_booking(12345).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let err = repo
        .create_booking(&CreateBooking::new(2, "08:00"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));

    // A token the server does not know is a 401, not a local auth error.
    repo.session().set("forged");
    let err = repo.current_user().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    let err = repo
        .create_payment(&CreatePayment::new(1, 10.0, PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn duplicate_registration_is_http_error() {
    let base_url = start_server().await;
    let repo = repository(&base_url);
    repo.register(&alice()).await.unwrap();

    let other = repository(&base_url);
    let err = other.register(&alice()).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert!(!other.session().is_authenticated());
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let repo = repository(&format!("http://{addr}"));
    let err = repo.list_services().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn sessions_are_shared_between_clones() {
    let base_url = start_server().await;
    let session = Session::new();
    let config = ClientConfig::default().with_base_url(&base_url);
    let first = ApiRepository::from_config(&config, session.clone()).unwrap();
    let second = ApiRepository::from_config(&config, session).unwrap();

    first.register(&alice()).await.unwrap();
    let me = second.current_user().await.unwrap();
    assert_eq!(me.username, "alice");
}
