use crate::db::DbPool;
use crate::models::Notification;
use crate::schema::notifications;
use anyhow::Result;
use diesel::prelude::*;
use tracing::instrument;

/// Lists the notifications of a user, newest first
#[instrument(skip(pool))]
pub fn list_notifications(pool: &DbPool, user_id: &str, unread_only: bool) -> Result<Vec<Notification>> {
    let conn = &mut pool.get()?;

    let mut query = notifications::table
        .filter(notifications::user_id.eq(user_id))
        .order(notifications::created_at.desc())
        .into_boxed();
    if unread_only {
        query = query.filter(notifications::read.eq(false));
    }

    Ok(query.load::<Notification>(conn)?)
}

/// Marks a notification as read
///
/// ### Returns
///
/// The notification, or None if it does not exist
#[instrument(skip(pool))]
pub fn mark_notification_read(pool: &DbPool, notification_id: &str) -> Result<Option<Notification>> {
    let conn = &mut pool.get()?;

    diesel::update(notifications::table.find(notification_id))
        .set(notifications::read.eq(true))
        .execute(conn)?;

    let result = notifications::table
        .find(notification_id)
        .first::<Notification>(conn)
        .optional()?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QUOTE_RECEIVED;
    use crate::test_utils::setup_test_db;

    fn insert(pool: &DbPool, user_id: &str) -> Notification {
        let notification = Notification::new(
            user_id.to_string(),
            QUOTE_RECEIVED,
            "Prices received".to_string(),
            "2 materials priced".to_string(),
            None,
            serde_json::json!({}),
        );
        let conn = &mut pool.get().unwrap();
        diesel::insert_into(notifications::table)
            .values(&notification)
            .execute(conn)
            .unwrap();
        notification
    }

    #[test]
    fn test_list_and_mark_read() {
        let pool = setup_test_db();
        let first = insert(&pool, "owner-1");
        insert(&pool, "owner-1");
        insert(&pool, "owner-2");

        assert_eq!(list_notifications(&pool, "owner-1", false).unwrap().len(), 2);

        let read = mark_notification_read(&pool, &first.get_id()).unwrap().unwrap();
        assert!(read.is_read());
        assert_eq!(list_notifications(&pool, "owner-1", true).unwrap().len(), 1);
        assert!(mark_notification_read(&pool, "missing").unwrap().is_none());
    }
}
