//! Notification bridge.
//!
//! Thin adapter between projection results and the external notification
//! channel. Delivery is fire-and-forget: failures and timeouts are logged
//! and swallowed, never surfaced as domain failures.

mod notification_bridge;
mod notification_traits;

pub use notification_bridge::NotificationBridge;
pub use notification_traits::{MockNotifier, NoOpNotifier, Notifier};
