use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::db::Database;
use crate::db::sql_types::timestamp_column;
use crate::error::{Error, Result};
use crate::models::{User, UserId, UserLookup};
use crate::utils::time::format_timestamp;

const USER_COLUMNS: &str = "user_id, email, name, created_at";

#[derive(Clone)]
pub struct UsersDao {
    db: Arc<Database>,
}

impl UsersDao {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn create_user(&self, email: &str, name: &str, now: DateTime<Utc>) -> Result<User> {
        let user = User {
            id: UserId::new(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: now,
        };

        self.db.transaction(|tx| {
            if find_by_email(tx, &user.email)?.is_some() {
                return Err(Error::Conflict(
                    "An account with this email already exists.".into(),
                ));
            }

            tx.execute(
                "INSERT INTO users (user_id, email, name, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![user.id, &user.email, &user.name, format_timestamp(&user.created_at)],
            )?;
            Ok(())
        })?;

        Ok(user)
    }

    /// Find the user a lookup refers to. An id match always beats an email
    /// match; the email is only tried when the id finds nobody.
    pub fn find_user(&self, lookup: &UserLookup) -> Result<Option<User>> {
        self.db.with_connection(|conn| {
            if let Some(id) = lookup.id()
                && let Some(user) = find_by_id(conn, id)?
            {
                return Ok(Some(user));
            }

            match lookup.email() {
                Some(email) => find_by_email(conn, email),
                None => Ok(None),
            }
        })
    }

    pub fn resolve(&self, lookup: &UserLookup) -> Result<User> {
        self.find_user(lookup)?.ok_or_else(Error::user_not_found)
    }
}

fn find_by_id(conn: &Connection, id: UserId) -> Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE user_id = ?1", USER_COLUMNS),
            params![id],
            map_user,
        )
        .optional()?;
    Ok(user)
}

fn find_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
            params![email],
            map_user,
        )
        .optional()?;
    Ok(user)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::db::open_in_memory;
    use crate::error::ErrorKind;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_create_and_find_user() {
        let dao = UsersDao::new(open_in_memory().unwrap());
        let user = dao.create_user("ada@example.com", "Ada", now()).unwrap();

        let by_id = dao.find_user(&UserLookup::Id(user.id)).unwrap();
        assert_eq!(by_id, Some(user.clone()));

        let by_email = dao
            .find_user(&UserLookup::Email("ada@example.com".into()))
            .unwrap();
        assert_eq!(by_email, Some(user));
    }

    #[test]
    fn test_duplicate_email_is_conflict() {
        let dao = UsersDao::new(open_in_memory().unwrap());
        dao.create_user("ada@example.com", "Ada", now()).unwrap();

        let err = dao.create_user("ada@example.com", "Other", now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_id_wins_over_email() {
        let dao = UsersDao::new(open_in_memory().unwrap());
        let ada = dao.create_user("ada@example.com", "Ada", now()).unwrap();
        let bob = dao.create_user("bob@example.com", "Bob", now()).unwrap();

        let lookup = UserLookup::IdOrEmail(ada.id, "bob@example.com".into());
        assert_eq!(dao.resolve(&lookup).unwrap().id, ada.id);

        // An id nobody has falls back to the email
        let lookup = UserLookup::IdOrEmail(UserId::new(), "bob@example.com".into());
        assert_eq!(dao.resolve(&lookup).unwrap().id, bob.id);
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let dao = UsersDao::new(open_in_memory().unwrap());

        let err = dao.resolve(&UserLookup::Id(UserId::new())).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "User not found.");

        assert!(dao.resolve(&UserLookup::Unresolvable).unwrap_err().is_not_found());
    }
}
