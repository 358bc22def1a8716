//! Reconnection policy of the client.
//!
//! Pure functions without side effects, used by the connection task.

use std::time::Duration;

use crate::error::ClientError;

pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(5);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long an unused connection survives before it is torn down
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(3000);

/// Check if the error is final and retrying cannot help.
///
/// A rejected token stays rejected, so it is never retried.
pub fn should_give_up(error: &ClientError) -> bool {
    matches!(error, ClientError::Unauthorized)
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The error that ended the previous attempt
/// * `reconnect_count` - Reconnections already attempted (0 after the first failure)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(error: &ClientError, reconnect_count: u32, max_attempts: u32) -> bool {
    if should_give_up(error) {
        return false;
    }

    reconnect_count < max_attempts
}
