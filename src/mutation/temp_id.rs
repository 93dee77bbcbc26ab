use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::model::CommentId;

/// Largest magnitude of a temporary post id.
const TEMP_POST_ID_RANGE: i64 = 1_000_000;

static COMMENT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Random negative id for a post that the server has not confirmed yet.
/// Server ids are positive, so the two ranges never overlap.
pub fn next_post_id() -> i64 {
    -rand::thread_rng().gen_range(1..=TEMP_POST_ID_RANGE)
}

/// Time-based token for an unconfirmed comment, e.g. `temp-1718000000000-3`.
/// The sequence suffix keeps tokens unique within the same millisecond.
pub fn next_comment_token() -> CommentId {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let sequence = COMMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CommentId::Temp(format!("{}{}-{}", CommentId::TEMP_PREFIX, millis, sequence))
}
