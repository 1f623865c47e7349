//! SDK entry point.

use std::sync::Arc;

use crate::config::ClientConfiguration;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::model::database::Database;

/// Mochow SDK client.
///
/// Owns the shared HTTP connection pool. The configuration passed at
/// construction is merged over the built-in defaults and cloned — never
/// shared by reference — into every derived per-call configuration, so a
/// caller override can never mutate the client's view.
#[derive(Debug)]
pub struct MochowClient {
    conn: Arc<HttpClient>,
    config: ClientConfiguration,
}

impl MochowClient {
    pub fn new(config: ClientConfiguration) -> Result<Self> {
        let config = ClientConfiguration::default().merge(&config);
        let conn = Arc::new(HttpClient::new(&config)?);
        Ok(MochowClient { conn, config })
    }

    fn merge_config(&self, config: Option<&ClientConfiguration>) -> ClientConfiguration {
        match config {
            Some(over) => self.config.merge(over),
            None => self.config.clone(),
        }
    }

    /// Create a database and return its handle.
    pub fn create_database(
        &self,
        database_name: &str,
        config: Option<&ClientConfiguration>,
    ) -> Result<Database> {
        let config = self.merge_config(config);
        let db = Database::new(Arc::clone(&self.conn), config, database_name.to_string());
        db.create_database(None)?;
        Ok(db)
    }

    /// List all databases of the instance.
    pub fn list_databases(&self, config: Option<&ClientConfiguration>) -> Result<Vec<Database>> {
        let config = self.merge_config(config);
        let db = Database::new(Arc::clone(&self.conn), config, String::new());
        db.list_databases(None)
    }

    /// Look up one database by name; a miss is a client error.
    pub fn database(
        &self,
        database_name: &str,
        config: Option<&ClientConfiguration>,
    ) -> Result<Database> {
        for db in self.list_databases(config)? {
            if db.database_name() == database_name {
                return Ok(db);
            }
        }
        Err(Error::client(format!(
            "Database not exist: {database_name}"
        )))
    }

    /// Drop one database by name.
    pub fn drop_database(
        &self,
        database_name: &str,
        config: Option<&ClientConfiguration>,
    ) -> Result<()> {
        let db = self.database(database_name, config)?;
        db.drop_database(None)
    }

    /// Close the connection. Every handle sharing this client observes the
    /// closure: later sends fail fast with a client error.
    pub fn close(&self) {
        self.conn.close();
    }
}
