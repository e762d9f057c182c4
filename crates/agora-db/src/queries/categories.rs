use rusqlite::{Connection, ToSql, params};

use crate::models::CategoryRow;
use crate::{Database, DbResult};

/// Which entity a category set is attached to.
#[derive(Debug, Clone, Copy)]
pub enum CategoryLink {
    Post,
    User,
    Channel,
}

impl CategoryLink {
    fn table(self) -> &'static str {
        match self {
            Self::Post => "post_categories",
            Self::User => "user_categories",
            Self::Channel => "channel_categories",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Post => "post_id",
            Self::User => "user_id",
            Self::Channel => "channel_id",
        }
    }
}

impl Database {
    /// Fails with `DbError::Conflict` when the name exists.
    pub fn create_category(&self, name: &str) -> DbResult<i64> {
        self.with_conn(|conn| {
            conn.execute("INSERT INTO categories (name) VALUES (?1)", [name])?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_categories(&self) -> DbResult<Vec<CategoryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(CategoryRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn categories_for(&self, link: CategoryLink, owner: &dyn ToSql) -> DbResult<Vec<CategoryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT c.id, c.name FROM categories c
                 JOIN {table} l ON l.category_id = c.id
                 WHERE l.{column} = ?1
                 ORDER BY c.name",
                table = link.table(),
                column = link.column(),
            ))?;
            let rows = stmt
                .query_map([owner], |row| {
                    Ok(CategoryRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Replaces the category set of `owner`.
    pub fn set_categories(
        &self,
        link: CategoryLink,
        owner: &dyn ToSql,
        category_ids: &[i64],
    ) -> DbResult<()> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                &format!("DELETE FROM {} WHERE {} = ?1", link.table(), link.column()),
                [owner],
            )?;
            link_categories(&tx, link, owner, category_ids)?;
            tx.commit()?;
            Ok(())
        })
    }
}

/// Attaches existing categories to `owner`; unknown ids are skipped.
pub(crate) fn link_categories(
    conn: &Connection,
    link: CategoryLink,
    owner: &dyn ToSql,
    category_ids: &[i64],
) -> DbResult<()> {
    let sql = format!(
        "INSERT OR IGNORE INTO {table} ({column}, category_id)
         SELECT ?1, id FROM categories WHERE id = ?2",
        table = link.table(),
        column = link.column(),
    );
    let mut stmt = conn.prepare(&sql)?;
    for category_id in category_ids {
        stmt.execute(params![owner, category_id])?;
    }
    Ok(())
}
