//! Offline unit tests for cobalt-db pool configuration and row types.
//! These tests do not require a live database connection.

use cobalt_core::{AppConfig, Environment};
use cobalt_db::{BookingRow, PoolConfig, PromotionRow, UserRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000),
        log_level: "info".to_string(),
        cors_origins: vec![],
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        provider_timeout_secs: 8,
        maps_api_key: None,
        openai_api_key: None,
        openai_model: "gpt-3.5-turbo".to_string(),
        elevenlabs_api_key: None,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn user_row_never_serializes_password_hash() {
    use chrono::Utc;

    let row = UserRow {
        id: 1,
        email: "anna@example.com".to_string(),
        password_hash: "deadbeef".to_string(),
        user_type: "client".to_string(),
        full_name: None,
        address: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let json = serde_json::to_value(&row).expect("serialize user row");
    assert_eq!(json["email"], "anna@example.com");
    assert!(json.get("password_hash").is_none());
}

#[test]
fn booking_row_serializes_date_and_time_as_strings() {
    use chrono::{NaiveDate, NaiveTime, Utc};

    let row = BookingRow {
        id: 3,
        client_id: 1,
        service_id: Some(2),
        master_id: None,
        company_id: Some(1),
        booking_date: NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"),
        booking_time: NaiveTime::from_hms_opt(10, 30, 0).expect("valid time"),
        status: "pending".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let json = serde_json::to_value(&row).expect("serialize booking row");
    assert_eq!(json["booking_date"], "2025-03-14");
    assert_eq!(json["booking_time"], "10:30:00");
    assert!(json["master_id"].is_null());
}

#[test]
fn promotion_row_exposes_type_field() {
    use chrono::Utc;

    let row = PromotionRow {
        id: 1,
        company_id: 1,
        promo_type: "discount".to_string(),
        description: Some("Spring sale".to_string()),
        discount: Some(15.0),
        conditions: serde_json::json!({}),
        created_at: Utc::now(),
    };

    let json = serde_json::to_value(&row).expect("serialize promotion row");
    assert_eq!(json["type"], "discount");
    assert!(json.get("promo_type").is_none());
}
