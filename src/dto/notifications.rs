//! DTOs used by the admin notifications view.

use crate::domain::notification::{Notification, NotificationStatus};

#[derive(Debug, PartialEq)]
pub struct NotificationsPageData {
    /// Status the list was filtered by, if any.
    pub status: Option<NotificationStatus>,
    pub notifications: Vec<Notification>,
}
