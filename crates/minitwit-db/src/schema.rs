use rusqlite::Connection;
use tracing::info;

use crate::Result;

/// Create the tables if they are missing. Existing tables are left untouched.
pub fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS user (
            user_id     INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL,
            email       TEXT NOT NULL,
            pw_hash     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS follower (
            who_id      INTEGER NOT NULL REFERENCES user(user_id),
            whom_id     INTEGER NOT NULL REFERENCES user(user_id)
        );

        CREATE TABLE IF NOT EXISTS message (
            message_id  INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id   INTEGER NOT NULL REFERENCES user(user_id),
            text        TEXT NOT NULL,
            pub_date    INTEGER,
            flagged     INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_message_pub_date
            ON message(pub_date);

        CREATE INDEX IF NOT EXISTS idx_follower_who
            ON follower(who_id);
        ",
    )?;

    info!("Database schema ready");
    Ok(())
}
