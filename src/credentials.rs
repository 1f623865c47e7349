//! Credentials for a Mochow instance.
//!
//! Credentials are immutable once constructed; they are only ever read by
//! the request signer to derive authorization header values.

/// Access credentials for a Mochow instance.
///
/// The plain variant carries the account name and API key issued for the
/// instance. The AppBuilder variant additionally carries a bearer token for
/// the auxiliary AppBuilder service, which the signer emits as a second
/// authorization header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Account + API key.
    Bce { account: String, api_key: String },
    /// Account + API key + AppBuilder bearer token.
    AppBuilder {
        account: String,
        api_key: String,
        appbuilder_token: String,
    },
}

impl Credentials {
    /// Create plain account/API-key credentials.
    pub fn new(account: impl Into<String>, api_key: impl Into<String>) -> Self {
        Credentials::Bce {
            account: account.into(),
            api_key: api_key.into(),
        }
    }

    /// Create credentials that also authenticate against AppBuilder.
    pub fn with_appbuilder_token(
        account: impl Into<String>,
        api_key: impl Into<String>,
        appbuilder_token: impl Into<String>,
    ) -> Self {
        Credentials::AppBuilder {
            account: account.into(),
            api_key: api_key.into(),
            appbuilder_token: appbuilder_token.into(),
        }
    }

    /// The account name.
    pub fn account(&self) -> &str {
        match self {
            Credentials::Bce { account, .. } | Credentials::AppBuilder { account, .. } => account,
        }
    }

    /// The API key.
    pub fn api_key(&self) -> &str {
        match self {
            Credentials::Bce { api_key, .. } | Credentials::AppBuilder { api_key, .. } => api_key,
        }
    }
}
