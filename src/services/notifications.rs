//! Admin notification listing.

use crate::api::NotificationApi;
use crate::domain::notification::NotificationStatus;
use crate::dto::notifications::NotificationsPageData;
use crate::services::session::SessionContext;
use crate::services::{ServiceError, ServiceResult};

/// Lists notifications, optionally filtered by status. Admins only.
pub fn list_notifications<A, C>(
    api: &A,
    session: &C,
    status: Option<NotificationStatus>,
) -> ServiceResult<NotificationsPageData>
where
    A: NotificationApi + ?Sized,
    C: SessionContext + ?Sized,
{
    let role = match session.current_user() {
        Some(user) if user.is_admin() => user.role,
        _ => return Err(ServiceError::Unauthorized),
    };

    let notifications = api.list_notifications(&role, status).map_err(|e| {
        log::error!("Failed to fetch notifications: {e}");
        e
    })?;

    Ok(NotificationsPageData {
        status,
        notifications,
    })
}
