use ahash::HashSet;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

static SEEN_MESSAGES: Lazy<Mutex<HashSet<String>>> =
    Lazy::new(|| Mutex::new(HashSet::default()));

/// Returns `true` the first time a given message is seen, `false` after that.
///
/// Implementation detail of [`crate::warn_once!`] and [`crate::info_once!`].
pub fn log_once_if_new(msg: &str) -> bool {
    let mut seen = SEEN_MESSAGES.lock();
    if seen.contains(msg) {
        false
    } else {
        seen.insert(msg.to_owned());
        true
    }
}
