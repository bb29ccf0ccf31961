//! Unique naming for test-created resources
//!
//! Parallel and repeated runs create resources against the same shared
//! deployment; names carry a timestamp and a per-process suffix so runs
//! never collide and cleanup can target exactly what a run created.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use chrono::Utc;
use rand::Rng;

const SUFFIX_LEN: usize = 5;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_SPACE: u64 = 36u64.pow(SUFFIX_LEN as u32);

static SUFFIX_SEQ: AtomicU64 = AtomicU64::new(0);
static SUFFIX_OFFSET: OnceLock<u64> = OnceLock::new();

/// Generate `{prefix}_{millis}_{suffix}` with a 5-char base-36 suffix.
///
/// The suffix starts at a random per-process offset and advances once per
/// call, so two calls within the same millisecond still differ.
pub fn unique_name(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let offset = *SUFFIX_OFFSET.get_or_init(|| rand::thread_rng().gen_range(0..SUFFIX_SPACE));
    let seq = SUFFIX_SEQ.fetch_add(1, Ordering::Relaxed);
    let suffix = encode_base36(offset.wrapping_add(seq) % SUFFIX_SPACE);

    format!("{prefix}_{millis}_{suffix}")
}

/// Random lowercase base-36 string, for throwaway test values.
pub fn random_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

fn encode_base36(mut value: u64) -> String {
    let mut out = [b'0'; SUFFIX_LEN];
    for slot in out.iter_mut().rev() {
        *slot = BASE36[(value % 36) as usize];
        value /= 36;
    }
    String::from_utf8_lossy(&out).into_owned()
}
