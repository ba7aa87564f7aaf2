use super::*;

fn execution(started_secs_ago: i64, duration_ms: i64, succeeded: bool) -> Execution {
    let completed_at = Utc::now() - chrono::Duration::seconds(started_secs_ago);
    Execution { started_at: completed_at - chrono::Duration::milliseconds(duration_ms), completed_at, succeeded }
}

#[test]
fn an_empty_window_reports_ok_with_no_samples() {
    let monitor = SlaMonitor::new();
    let schedule_id = ScheduleId::new();
    let config = SlaConfig { target_success_rate: 0.99, target_p95_ms: 1000, max_duration_ms: 5000 };
    assert!(monitor.stats(schedule_id, &config).is_none());
}

#[test]
fn healthy_executions_report_ok() {
    let monitor = SlaMonitor::new();
    let schedule_id = ScheduleId::new();
    let config = SlaConfig { target_success_rate: 0.9, target_p95_ms: 1000, max_duration_ms: 5000 };

    for _ in 0..10 {
        monitor.record(schedule_id, execution(0, 100, true), Some(&config));
    }

    let stats = monitor.stats(schedule_id, &config).unwrap();
    assert_eq!(stats.status, SlaStatus::Ok);
    assert_eq!(stats.success_rate, 1.0);
}

#[test]
fn low_success_rate_breaches_and_publishes_an_alert() {
    let monitor = SlaMonitor::new();
    let mut alerts = monitor.subscribe();
    let schedule_id = ScheduleId::new();
    let config = SlaConfig { target_success_rate: 0.9, target_p95_ms: 5000, max_duration_ms: 10_000 };

    for i in 0..10 {
        monitor.record(schedule_id, execution(0, 100, i < 5), Some(&config));
    }

    let stats = monitor.stats(schedule_id, &config).unwrap();
    assert_eq!(stats.status, SlaStatus::Breached);
    let alert = alerts.try_recv().unwrap();
    assert_eq!(alert.schedule_id, schedule_id);
}

#[test]
fn exceeding_max_duration_breaches_regardless_of_success_rate() {
    let monitor = SlaMonitor::new();
    let schedule_id = ScheduleId::new();
    let config = SlaConfig { target_success_rate: 0.5, target_p95_ms: 50_000, max_duration_ms: 1000 };

    monitor.record(schedule_id, execution(0, 5000, true), Some(&config));
    let stats = monitor.stats(schedule_id, &config).unwrap();
    assert_eq!(stats.status, SlaStatus::Breached);
}

#[test]
fn window_is_bounded_to_its_capacity() {
    let monitor = SlaMonitor::new();
    let schedule_id = ScheduleId::new();
    let config = SlaConfig { target_success_rate: 0.5, target_p95_ms: 50_000, max_duration_ms: 50_000 };

    for _ in 0..(WINDOW_CAPACITY + 20) {
        monitor.record(schedule_id, execution(0, 10, true), Some(&config));
    }

    let stats = monitor.stats(schedule_id, &config).unwrap();
    assert_eq!(stats.sample_count, WINDOW_CAPACITY);
}
