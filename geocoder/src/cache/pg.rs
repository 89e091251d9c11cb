//! PostgreSQL cache store.

use postgres::{Client, NoTls};

use super::error::StoreError;
use super::location::CACHE_LAYER_NAME;
use super::store::{CacheStore, FIELD_BLOB, FIELD_URL};

/// Lookup statement. The table is append-only, so `ctid` order is insertion
/// order and the oldest duplicate wins.
fn lookup_statement() -> String {
    format!(
        "SELECT {FIELD_BLOB} FROM {CACHE_LAYER_NAME} WHERE {FIELD_URL} = $1 ORDER BY ctid LIMIT 1"
    )
}

/// Cache store in a PostgreSQL table.
pub struct PgStore {
    client: Client,
}

impl PgStore {
    /// Connect using a libpq-style connection string.
    pub fn connect(conninfo: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::connect(conninfo, NoTls)?,
        })
    }
}

impl CacheStore for PgStore {
    fn ensure_layer(&mut self, create: bool) -> Result<bool, StoreError> {
        let columns: Vec<String> = self
            .client
            .query(
                "SELECT column_name::text FROM information_schema.columns WHERE table_name = $1",
                &[&CACHE_LAYER_NAME],
            )?
            .iter()
            .map(|row| row.get(0))
            .collect();

        if columns.is_empty() {
            if !create {
                return Ok(false);
            }
            self.client.batch_execute(&format!(
                "CREATE TABLE {CACHE_LAYER_NAME} ({FIELD_URL} TEXT, {FIELD_BLOB} TEXT);
                 CREATE INDEX idx_{FIELD_URL}_{CACHE_LAYER_NAME} ON {CACHE_LAYER_NAME} ({FIELD_URL});"
            ))?;
            return Ok(true);
        }

        if columns.iter().any(|c| c == FIELD_URL) && columns.iter().any(|c| c == FIELD_BLOB) {
            Ok(true)
        } else {
            Err(StoreError::InvalidSchema(CACHE_LAYER_NAME.to_string()))
        }
    }

    fn lookup(&mut self, url: &str) -> Result<Option<String>, StoreError> {
        let row = self.client.query_opt(&lookup_statement(), &[&url])?;
        Ok(row.and_then(|row| row.get::<_, Option<String>>(0)))
    }

    fn append(&mut self, url: &str, body: &str) -> Result<(), StoreError> {
        self.client.execute(
            &format!("INSERT INTO {CACHE_LAYER_NAME} ({FIELD_URL}, {FIELD_BLOB}) VALUES ($1, $2)"),
            &[&url, &body],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_takes_oldest_row() {
        assert_eq!(
            lookup_statement(),
            "SELECT blob FROM geocode_cache WHERE url = $1 ORDER BY ctid LIMIT 1"
        );
    }

    #[test]
    fn unreachable_server_is_an_error() {
        assert!(matches!(
            PgStore::connect("host=127.0.0.1 port=1 connect_timeout=1"),
            Err(StoreError::Postgres(_))
        ));
    }
}
