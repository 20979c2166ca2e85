//! Expiring Link Arithmetic Tests
//!
//! The boundary rule is strict: at `elapsed == ttl` a link is expired.

use time::{Duration, OffsetDateTime};

use imagex::app::links::{seconds_left, validate_ttl, MAX_TTL_SECONDS, MIN_TTL_SECONDS};

fn at(seconds_ago: i64) -> (OffsetDateTime, OffsetDateTime) {
    let now = OffsetDateTime::now_utc();
    (now - Duration::seconds(seconds_ago), now)
}

#[test]
fn active_one_second_before_the_boundary() {
    let (created_at, now) = at(3599);
    assert_eq!(seconds_left(created_at, 3600, now), 1);
}

#[test]
fn expired_exactly_at_the_boundary() {
    let (created_at, now) = at(3600);
    assert_eq!(seconds_left(created_at, 3600, now), 0);
}

#[test]
fn expired_after_the_boundary_and_never_negative() {
    let (created_at, now) = at(3601);
    assert_eq!(seconds_left(created_at, 3600, now), 0);

    let (created_at, now) = at(1_000_000);
    assert_eq!(seconds_left(created_at, 3600, now), 0);
}

#[test]
fn partial_elapsed_seconds_truncate_in_the_links_favor() {
    let now = OffsetDateTime::now_utc();
    let created_at = now - Duration::milliseconds(3_599_500);
    assert_eq!(seconds_left(created_at, 3600, now), 1);
}

#[test]
fn full_ttl_remains_at_issuance_time() {
    let now = OffsetDateTime::now_utc();
    assert_eq!(seconds_left(now, 3600, now), 3600);
}

#[test]
fn resolution_is_idempotent_for_an_expired_link() {
    let (created_at, now) = at(5000);
    for _ in 0..10 {
        assert_eq!(seconds_left(created_at, 3600, now), 0);
    }
}

#[test]
fn ttl_bounds_are_inclusive() {
    assert!(validate_ttl(MIN_TTL_SECONDS).is_ok());
    assert!(validate_ttl(MAX_TTL_SECONDS).is_ok());
    assert!(validate_ttl(MIN_TTL_SECONDS - 1).is_err());
    assert!(validate_ttl(MAX_TTL_SECONDS + 1).is_err());
}

#[test]
fn ttl_far_out_of_range_is_rejected() {
    assert!(validate_ttl(0).is_err());
    assert!(validate_ttl(-300).is_err());
    assert!(validate_ttl(i64::MAX).is_err());
}
