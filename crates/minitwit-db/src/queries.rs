use rusqlite::{Connection, OptionalExtension, Params, Row, params};

use crate::Database;
use crate::Result;
use crate::models::{FolloweeRow, MessageRow};

impl Database {
    // -- Users --

    /// Insert a user unless `username` is already registered. Returns the
    /// new id, or `None` when the name is taken. The lookup and the insert
    /// run in one transaction under the connection lock.
    pub fn create_user_if_absent(
        &self,
        username: &str,
        email: &str,
        pw_hash: &str,
    ) -> Result<Option<i64>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT user_id FROM user WHERE username = ?1 LIMIT 1",
                    [username],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO user (username, email, pw_hash) VALUES (?1, ?2, ?3)",
                (username, email, pw_hash),
            )?;
            let user_id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(Some(user_id))
        })
    }

    pub fn get_user_id(&self, username: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let id = conn
                .query_row(
                    "SELECT user_id FROM user WHERE username = ?1 LIMIT 1",
                    [username],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id)
        })
    }

    // -- Messages --

    /// Newest non-flagged messages from every author.
    pub fn public_messages(&self, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            collect(
                conn,
                "SELECT m.message_id, m.author_id, u.username, m.text, m.pub_date, m.flagged
                 FROM message m
                 JOIN user u ON m.author_id = u.user_id
                 WHERE m.flagged = 0
                 ORDER BY m.pub_date DESC, m.message_id DESC
                 LIMIT ?1",
                params![limit],
                MessageRow::from_row,
            )
        })
    }

    /// Newest non-flagged messages written by `author_id`.
    pub fn user_messages(&self, author_id: i64, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            collect(
                conn,
                "SELECT m.message_id, m.author_id, u.username, m.text, m.pub_date, m.flagged
                 FROM message m
                 JOIN user u ON m.author_id = u.user_id
                 WHERE m.flagged = 0 AND u.user_id = ?1
                 ORDER BY m.pub_date DESC, m.message_id DESC
                 LIMIT ?2",
                params![author_id, limit],
                MessageRow::from_row,
            )
        })
    }

    /// Insert an unflagged message and return its id.
    pub fn insert_message(&self, author_id: i64, text: &str, pub_date: i64) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO message (author_id, text, pub_date, flagged) VALUES (?1, ?2, ?3, 0)",
                params![author_id, text, pub_date],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    // -- Follows --

    /// Add a `who -> whom` edge. Duplicate edges are stored as-is.
    pub fn follow(&self, who_id: i64, whom_id: i64) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "INSERT INTO follower (who_id, whom_id) VALUES (?1, ?2)",
                params![who_id, whom_id],
            )?;
            Ok(affected)
        })
    }

    /// Remove every `who -> whom` edge. Returns the number of edges removed.
    pub fn unfollow(&self, who_id: i64, whom_id: i64) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "DELETE FROM follower WHERE who_id = ?1 AND whom_id = ?2",
                params![who_id, whom_id],
            )?;
            Ok(affected)
        })
    }

    /// Usernames followed by `who_id`, each listed once, in the order they
    /// were first followed.
    pub fn followees(&self, who_id: i64, limit: u32) -> Result<Vec<FolloweeRow>> {
        self.with_conn(|conn| {
            collect(
                conn,
                "SELECT u.username AS username
                 FROM follower f
                 JOIN user u ON f.whom_id = u.user_id
                 WHERE f.who_id = ?1
                 GROUP BY u.user_id
                 ORDER BY MIN(f.rowid)
                 LIMIT ?2",
                params![who_id, limit],
                FolloweeRow::from_row,
            )
        })
    }
}

fn collect<P, T>(
    conn: &Connection,
    sql: &str,
    params: P,
    decode: fn(&Row<'_>) -> Result<T>,
) -> Result<Vec<T>>
where
    P: Params,
{
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(decode(row)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbError;

    fn db_with_users(names: &[&str]) -> (Database, Vec<i64>) {
        let db = Database::open_in_memory().unwrap();
        let ids = names
            .iter()
            .map(|n| {
                db.create_user_if_absent(n, &format!("{n}@example.com"), "hash")
                    .unwrap()
                    .unwrap()
            })
            .collect();
        (db, ids)
    }

    #[test]
    fn created_user_is_resolvable() {
        let (db, ids) = db_with_users(&["alice"]);

        assert_eq!(db.get_user_id("alice").unwrap(), Some(ids[0]));
        assert_eq!(db.get_user_id("bob").unwrap(), None);

        let (email, pw_hash): (String, String) = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT email, pw_hash FROM user WHERE user_id = ?1",
                    [ids[0]],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?)
            })
            .unwrap();
        assert_eq!(email, "alice@example.com");
        assert_eq!(pw_hash, "hash");
    }

    #[test]
    fn taken_username_is_not_inserted_again() {
        let (db, ids) = db_with_users(&["alice"]);

        let again = db.create_user_if_absent("alice", "other@example.com", "h2").unwrap();
        assert_eq!(again, None);

        let rows: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM user WHERE username = 'alice'", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(db.get_user_id("alice").unwrap(), Some(ids[0]));
    }

    #[test]
    fn listings_are_newest_first_and_skip_flagged() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        db.insert_message(ids[0], "old", 100).unwrap();
        db.insert_message(ids[1], "middle", 200).unwrap();
        let hidden = db.insert_message(ids[0], "hidden", 300).unwrap();
        db.insert_message(ids[0], "new", 400).unwrap();
        db.with_conn(|conn| {
            conn.execute("UPDATE message SET flagged = 1 WHERE message_id = ?1", [hidden])?;
            Ok(())
        })
        .unwrap();

        let all: Vec<_> = db.public_messages(100).unwrap().into_iter().map(|m| m.text).collect();
        assert_eq!(all, ["new", "middle", "old"]);

        let limited = db.public_messages(2).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].username, "alice");
        assert_eq!(limited[1].username, "bob");

        let alice: Vec<_> = db.user_messages(ids[0], 100).unwrap().into_iter().map(|m| m.text).collect();
        assert_eq!(alice, ["new", "old"]);
    }

    #[test]
    fn same_second_messages_order_by_insertion() {
        let (db, ids) = db_with_users(&["alice"]);
        db.insert_message(ids[0], "first", 500).unwrap();
        db.insert_message(ids[0], "second", 500).unwrap();

        let msgs = db.user_messages(ids[0], 100).unwrap();
        assert_eq!(msgs[0].text, "second");
        assert_eq!(msgs[0].flagged, 0);
    }

    #[test]
    fn message_for_missing_author_is_rejected() {
        let (db, _) = db_with_users(&[]);
        let err = db.insert_message(42, "orphan", 1).unwrap_err();
        assert!(matches!(err, DbError::Sqlite(_)));
    }

    #[test]
    fn followees_are_deduplicated_and_unfollow_removes_all_edges() {
        let (db, ids) = db_with_users(&["a", "b", "c"]);
        db.follow(ids[0], ids[2]).unwrap();
        db.follow(ids[0], ids[1]).unwrap();
        db.follow(ids[0], ids[2]).unwrap();

        let names: Vec<_> = db.followees(ids[0], 100).unwrap().into_iter().map(|f| f.username).collect();
        assert_eq!(names, ["c", "b"]);

        assert_eq!(db.followees(ids[0], 1).unwrap().len(), 1);

        assert_eq!(db.unfollow(ids[0], ids[2]).unwrap(), 2);
        let names: Vec<_> = db.followees(ids[0], 100).unwrap().into_iter().map(|f| f.username).collect();
        assert_eq!(names, ["b"]);
    }

    #[test]
    fn read_against_missing_table_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute_batch("DROP TABLE message")?;
            Ok(())
        })
        .unwrap();

        assert!(db.public_messages(10).is_err());
    }
}
