//! Read-side views composed from both services.

use crate::domain::{build_calendar, CalendarEntry, DomainError, UserStatistics};
use crate::ports::inbound::{DocumentApi, NotificationApi};

/// Total, per-type counts, latest documents and the notification total.
pub async fn user_statistics<D, N>(
    documents: &D,
    notifications: &N,
    user_id: &str,
) -> Result<UserStatistics, DomainError>
where
    D: DocumentApi + ?Sized,
    N: NotificationApi + ?Sized,
{
    let total = documents.count(user_id).await?;
    let by_type = documents.count_by_type(user_id).await?;
    let latest = documents.find_latest(user_id).await?;
    let total_notifications = notifications.count_all(user_id).await?;

    Ok(UserStatistics {
        total,
        by_type,
        latest,
        total_notifications,
    })
}

/// Every reminder of the user joined with its document.
pub async fn user_calendar<D, N>(
    documents: &D,
    notifications: &N,
    user_id: &str,
) -> Result<Vec<CalendarEntry>, DomainError>
where
    D: DocumentApi + ?Sized,
    N: NotificationApi + ?Sized,
{
    let owned = documents.get_all(user_id).await?;
    let reminders = notifications.get_all_for_user(user_id).await?;
    Ok(build_calendar(&owned, &reminders))
}
