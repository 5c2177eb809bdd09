//! Notification feed and the shop-owner order poller that feeds it.

mod center;
mod poller;

pub use center::{
    DEFAULT_DISPLAY_DURATION, NotificationCenter, NotificationKind, NotificationRecord,
    ORDER_DISPLAY_DURATION,
};
pub use poller::{DEFAULT_POLL_INTERVAL, OrderPoller};
