//! Insert-id generation for event deduplication

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

const RANDOM_SEGMENT_LEN: usize = 10;

/// Generate a deduplication key of the form `{distinct_id}_{millis}_{random}`.
///
/// The distinct id is copied verbatim and may itself contain `_`. The last
/// two segments never do, so splitting from the right (`rsplitn(3, '_')`)
/// always recovers the distinct id, the millis and the random part. Collision resistance within a millisecond comes from the
/// random segment alone; no process-wide counter is kept.
pub fn generate(distinct_id: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SEGMENT_LEN)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect();
    format!("{distinct_id}_{millis}_{random}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn key_has_three_segments_led_by_distinct_id() {
        let key = generate("user123");
        assert!(key.starts_with("user123_"));
        let segments: Vec<&str> = key.split('_').collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], "user123");
        assert!(segments[1].parse::<i64>().is_ok());
        assert_eq!(segments[2].len(), RANDOM_SEGMENT_LEN);
    }

    #[test]
    fn distinct_id_with_underscore_splits_from_the_right() {
        let key = generate("u_1");
        assert!(key.starts_with("u_1_"));
        let segments: Vec<&str> = key.rsplitn(3, '_').collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2], "u_1");
        assert!(segments[1].parse::<i64>().is_ok());
        assert_eq!(segments[0].len(), RANDOM_SEGMENT_LEN);
        assert!(segments[0].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn consecutive_keys_never_collide() {
        let keys: HashSet<String> = (0..1000).map(|_| generate("user123")).collect();
        assert_eq!(keys.len(), 1000);
    }
}
