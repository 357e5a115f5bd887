// src/backend/users.rs
// =============================================================================
// The `users` table: one row per registered username (`uname`, unique).
// =============================================================================

use serde::{Deserialize, Serialize};

use super::client::Backend;
use crate::error::Result;

#[derive(Debug, Serialize, Deserialize)]
struct UserRow {
    uname: String,
}

impl Backend {
    /// Every registered username, in table order.
    pub async fn usernames(&self) -> Result<Vec<String>> {
        let mut url = self.url(&["rest", "v1", "users"]);
        url.query_pairs_mut().append_pair("select", "uname");
        let rows: Vec<UserRow> = self.send_json(self.get(url)).await?;
        Ok(rows.into_iter().map(|r| r.uname).collect())
    }

    /// Inserts a username. A duplicate surfaces as an Error::Backend for
    /// which is_unique_violation() is true.
    pub async fn insert_username(&self, uname: &str) -> Result<()> {
        let url = self.url(&["rest", "v1", "users"]);
        let rows = [UserRow {
            uname: uname.to_string(),
        }];
        self.send_unit(
            self.post(url)
                .header("Prefer", "return=representation")
                .json(&rows),
        )
        .await
    }
}
