use super::*;
use oj_core::ScheduleId;

#[test]
fn allows_up_to_the_configured_maximum_within_the_window() {
    let limiter = RateLimiter::new();
    let schedule_id = ScheduleId::new();
    let config = RateLimitConfig { max_executions: 2, window_seconds: 60 };
    let now = Utc::now();

    assert_eq!(limiter.try_acquire(schedule_id, &config, now), RateLimitDecision::Allow);
    assert_eq!(limiter.try_acquire(schedule_id, &config, now), RateLimitDecision::Allow);
    assert!(matches!(limiter.try_acquire(schedule_id, &config, now), RateLimitDecision::Reject { .. }));
}

#[test]
fn window_slides_forward_freeing_capacity() {
    let limiter = RateLimiter::new();
    let schedule_id = ScheduleId::new();
    let config = RateLimitConfig { max_executions: 1, window_seconds: 30 };
    let now = Utc::now();

    assert_eq!(limiter.try_acquire(schedule_id, &config, now), RateLimitDecision::Allow);
    assert!(matches!(limiter.try_acquire(schedule_id, &config, now + Duration::seconds(10)), RateLimitDecision::Reject { .. }));
    assert_eq!(limiter.try_acquire(schedule_id, &config, now + Duration::seconds(31)), RateLimitDecision::Allow);
}

#[test]
fn schedules_have_independent_windows() {
    let limiter = RateLimiter::new();
    let a = ScheduleId::new();
    let b = ScheduleId::new();
    let config = RateLimitConfig { max_executions: 1, window_seconds: 60 };
    let now = Utc::now();

    assert_eq!(limiter.try_acquire(a, &config, now), RateLimitDecision::Allow);
    assert_eq!(limiter.try_acquire(b, &config, now), RateLimitDecision::Allow);
}
