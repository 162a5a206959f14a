//! 会话与用户标识

use chrono::{DateTime, Utc};
use tracing::trace;

use super::env::TrackingEnvironment;

/// 会话存储中的键
pub const SESSION_ID_KEY: &str = "session_id";
/// 持久存储中的键
pub const USER_ID_KEY: &str = "user_id";

const SESSION_SUFFIX_LEN: usize = 9;

/// 生成 `session_<epoch-ms>_<9 位 base36>` 形式的会话 ID
pub fn generate_session_id(now: DateTime<Utc>) -> String {
    use std::iter;

    let chars = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let suffix: String = iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(SESSION_SUFFIX_LEN)
        .collect();

    format!("session_{}_{}", now.timestamp_millis(), suffix)
}

/// 读取会话 ID，不存在（或为空）时生成并写回
///
/// 没有会话存储时返回 `None`。
pub fn resolve_session_id(env: &dyn TrackingEnvironment) -> Option<String> {
    let Some(store) = env.session_store() else {
        trace!("Session: no session store available");
        return None;
    };

    if let Some(id) = store.get(SESSION_ID_KEY).filter(|id| !id.is_empty()) {
        return Some(id);
    }

    let id = generate_session_id(env.now());
    store.set(SESSION_ID_KEY, &id);
    trace!("Session: generated new session id {}", id);
    Some(id)
}

/// 只读查找用户 ID，从不生成
pub fn lookup_user_id(env: &dyn TrackingEnvironment) -> Option<String> {
    env.user_store()?.get(USER_ID_KEY)
}
