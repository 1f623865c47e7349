//! Database resource.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value as Json};

use crate::config::ClientConfiguration;
use crate::error::{Error, Result};
use crate::http::{HttpClient, Method};
use crate::model::enums::RequestType;
use crate::model::schema::Schema;
use crate::model::table::{Partition, Table, TableDescription};

/// Options of `create_table` beyond the required arguments.
#[derive(Debug, Clone, Default)]
pub struct CreateTableOptions {
    pub enable_dynamic_field: bool,
    pub description: Option<String>,
    pub config: Option<ClientConfiguration>,
}

#[derive(Deserialize)]
struct DatabasesWire {
    #[serde(default)]
    databases: Vec<String>,
}

#[derive(Deserialize)]
struct TablesWire {
    #[serde(default)]
    tables: Vec<String>,
}

/// Handle to one database.
#[derive(Debug, Clone)]
pub struct Database {
    pub(crate) conn: Arc<HttpClient>,
    pub(crate) config: ClientConfiguration,
    database_name: String,
}

impl Database {
    pub(crate) fn new(
        conn: Arc<HttpClient>,
        config: ClientConfiguration,
        database_name: String,
    ) -> Self {
        Database {
            conn,
            config,
            database_name,
        }
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    fn merge_config(&self, config: Option<&ClientConfiguration>) -> ClientConfiguration {
        match config {
            Some(over) => self.config.merge(over),
            None => self.config.clone(),
        }
    }

    fn require_name(&self) -> Result<()> {
        if self.database_name.is_empty() {
            return Err(Error::client("database name param not found"));
        }
        Ok(())
    }

    fn post(
        &self,
        request_type: RequestType,
        resource: &str,
        body: &Json,
        config: Option<&ClientConfiguration>,
    ) -> Result<crate::http::HttpResponse> {
        let config = self.merge_config(config);
        // A null body means a bodyless request (the list-databases call).
        let bytes = if body.is_null() {
            None
        } else {
            Some(
                serde_json::to_vec(body)
                    .map_err(|e| Error::client(format!("failed to encode request body: {e}")))?,
            )
        };
        self.conn.send_request(
            Method::Post,
            &crate::uri(resource),
            &[(request_type.as_str(), String::new())],
            bytes,
            &config,
        )
    }

    /// Create this database on the server.
    pub fn create_database(&self, config: Option<&ClientConfiguration>) -> Result<()> {
        self.require_name()?;
        let body = json!({ "database": self.database_name });
        self.post(RequestType::Create, "database", &body, config)?;
        Ok(())
    }

    /// Drop this database. DELETE with a valued query parameter, no body.
    pub fn drop_database(&self, config: Option<&ClientConfiguration>) -> Result<()> {
        self.require_name()?;
        let config = self.merge_config(config);
        self.conn.send_request(
            Method::Delete,
            &crate::uri("database"),
            &[("database", self.database_name.clone())],
            None,
            &config,
        )?;
        Ok(())
    }

    /// List all databases of the instance.
    pub fn list_databases(&self, config: Option<&ClientConfiguration>) -> Result<Vec<Database>> {
        let response = self.post(RequestType::List, "database", &Json::Null, config)?;
        let names = response.decode::<DatabasesWire>()?.databases;
        Ok(names
            .into_iter()
            .map(|name| Database::new(Arc::clone(&self.conn), self.config.clone(), name))
            .collect())
    }

    /// Create a table and return a handle carrying the declared description.
    pub fn create_table(
        &self,
        table_name: &str,
        replication: u32,
        partition: Partition,
        schema: Schema,
        options: &CreateTableOptions,
    ) -> Result<Table> {
        self.require_name()?;
        if table_name.is_empty() {
            return Err(Error::client("table name param not found"));
        }
        if schema.fields.is_empty() {
            return Err(Error::client("table schema param not found"));
        }

        let mut body = serde_json::Map::new();
        body.insert("database".to_string(), json!(self.database_name));
        body.insert("table".to_string(), json!(table_name));
        body.insert("replication".to_string(), json!(replication));
        body.insert("partition".to_string(), json!(partition));
        body.insert("schema".to_string(), json!(schema));
        body.insert(
            "enableDynamicField".to_string(),
            json!(options.enable_dynamic_field),
        );
        if let Some(description) = &options.description {
            body.insert("description".to_string(), json!(description));
        }
        self.post(
            RequestType::Create,
            "table",
            &Json::Object(body),
            options.config.as_ref(),
        )?;

        Ok(Table::new(
            Arc::clone(&self.conn),
            self.config.clone(),
            self.database_name.clone(),
            table_name.to_string(),
            replication,
            partition,
            schema,
            options.enable_dynamic_field,
            options.description.clone().unwrap_or_default(),
        ))
    }

    /// Drop one table. DELETE with valued query parameters, no body.
    pub fn drop_table(&self, table_name: &str, config: Option<&ClientConfiguration>) -> Result<()> {
        self.require_name()?;
        if table_name.is_empty() {
            return Err(Error::client("table name param not found"));
        }
        let config = self.merge_config(config);
        self.conn.send_request(
            Method::Delete,
            &crate::uri("table"),
            &[
                ("database", self.database_name.clone()),
                ("table", table_name.to_string()),
            ],
            None,
            &config,
        )?;
        Ok(())
    }

    /// Fetch the full table description from the server, including the
    /// server-populated createTime/state/aliases.
    pub fn describe_table(
        &self,
        table_name: &str,
        config: Option<&ClientConfiguration>,
    ) -> Result<Table> {
        self.require_name()?;
        if table_name.is_empty() {
            return Err(Error::client("table name param not found"));
        }
        let body = json!({ "database": self.database_name, "table": table_name });
        let response = self.post(RequestType::Desc, "table", &body, config)?;
        let table = response
            .field("table")
            .ok_or_else(|| Error::client("table description missing from response"))?;
        let description: TableDescription = serde_json::from_value(table.clone())
            .map_err(|e| Error::client(format!("failed to decode table description: {e}")))?;
        Ok(Table::from_description(
            Arc::clone(&self.conn),
            self.config.clone(),
            self.database_name.clone(),
            description,
        ))
    }

    /// Alias of `describe_table`.
    pub fn table(&self, table_name: &str, config: Option<&ClientConfiguration>) -> Result<Table> {
        self.describe_table(table_name, config)
    }

    /// List this database's tables, describing each one.
    pub fn list_table(&self, config: Option<&ClientConfiguration>) -> Result<Vec<Table>> {
        let body = json!({ "database": self.database_name });
        let response = self.post(RequestType::List, "table", &body, config)?;
        let names = response.decode::<TablesWire>()?.tables;
        names
            .into_iter()
            .map(|name| self.describe_table(&name, config))
            .collect()
    }
}
