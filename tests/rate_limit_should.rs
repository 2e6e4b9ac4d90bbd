use std::time::Duration;

use saveclip::server::services::rate_limit_services::{
    MemoryRateLimitService, RateLimitConfig, RateLimitResult, RateLimitServiceTrait,
};

#[tokio::test]
async fn test_allows_up_to_the_window_budget() {
    let limiter = MemoryRateLimitService::with_config(RateLimitConfig {
        max_requests_per_window: 3,
        window_seconds: 60,
    });

    for expected_remaining in [2, 1, 0] {
        match limiter.check_rate_limit("1.2.3.4").await {
            RateLimitResult::Allowed { remaining, .. } => {
                assert_eq!(remaining, expected_remaining)
            }
            RateLimitResult::RateLimited { .. } => panic!("request inside the budget was limited"),
        }
    }

    // the fourth request in the same window is out of budget
    match limiter.check_rate_limit("1.2.3.4").await {
        RateLimitResult::RateLimited { retry_after } => {
            assert!((1..=60).contains(&retry_after));
        }
        RateLimitResult::Allowed { .. } => panic!("request over the budget was allowed"),
    }
}

#[tokio::test]
async fn test_limits_clients_independently() {
    let limiter = MemoryRateLimitService::with_config(RateLimitConfig {
        max_requests_per_window: 1,
        window_seconds: 60,
    });

    assert!(matches!(
        limiter.check_rate_limit("1.1.1.1").await,
        RateLimitResult::Allowed { .. }
    ));
    assert!(matches!(
        limiter.check_rate_limit("1.1.1.1").await,
        RateLimitResult::RateLimited { .. }
    ));

    // a different client still has its own budget
    assert!(matches!(
        limiter.check_rate_limit("2.2.2.2").await,
        RateLimitResult::Allowed { .. }
    ));
    assert_eq!(limiter.tracked_clients().await, 2);
}

#[tokio::test]
async fn test_window_expiry_resets_the_budget() {
    let limiter = MemoryRateLimitService::with_config(RateLimitConfig {
        max_requests_per_window: 1,
        window_seconds: 1,
    });

    assert!(matches!(
        limiter.check_rate_limit("1.2.3.4").await,
        RateLimitResult::Allowed { .. }
    ));
    assert!(matches!(
        limiter.check_rate_limit("1.2.3.4").await,
        RateLimitResult::RateLimited { .. }
    ));

    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert!(matches!(
        limiter.check_rate_limit("1.2.3.4").await,
        RateLimitResult::Allowed { .. }
    ));
}

#[tokio::test]
async fn test_sweep_drops_only_expired_windows() {
    let limiter = MemoryRateLimitService::with_config(RateLimitConfig {
        max_requests_per_window: 5,
        window_seconds: 2,
    });

    limiter.check_rate_limit("stale").await;
    tokio::time::sleep(Duration::from_millis(2500)).await;
    limiter.check_rate_limit("fresh").await;

    assert_eq!(limiter.tracked_clients().await, 2);
    assert_eq!(limiter.sweep_expired().await, 1);
    assert_eq!(limiter.tracked_clients().await, 1);

    // the surviving window keeps counting
    assert!(matches!(
        limiter.check_rate_limit("fresh").await,
        RateLimitResult::Allowed { remaining, .. } if remaining == 3
    ));
}
