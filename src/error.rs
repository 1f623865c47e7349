//! Error types for the Mochow SDK.

use serde::{Deserialize, Serialize};

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Mochow SDK error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed call detected client-side (missing parameter, closed
    /// connection, mismatched search-request variant, ...). Never retried.
    #[error("client error: {0}")]
    Client(String),

    /// Non-2xx response decoded from the server. `code` is absent when the
    /// error body was empty and only the HTTP reason phrase was available.
    #[error("server error (status {status_code}, code {code:?}): {message}")]
    Server {
        status_code: u16,
        code: Option<ServerErrCode>,
        message: String,
        request_id: Option<String>,
    },

    /// Connection-level failure from the underlying HTTP client. Subject to
    /// the retry policy; after exhaustion the original error propagates
    /// unwrapped.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Filesystem failure from the local document hub.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn client(message: impl Into<String>) -> Self {
        Error::Client(message.into())
    }

    /// Server error code, when this is a server error that carried one.
    pub fn server_code(&self) -> Option<ServerErrCode> {
        match self {
            Error::Server { code, .. } => *code,
            _ => None,
        }
    }

    /// Whether this is a server error with the given code. Convenient for
    /// call sites that probe-and-ignore expected "not found" conditions.
    pub fn is_server_code(&self, expected: ServerErrCode) -> bool {
        self.server_code() == Some(expected)
    }
}

/// Error codes returned in the `code` field of the server's JSON error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ServerErrCode {
    InternalError,
    InvalidParameter,

    InvalidHttpUrl,
    InvalidHttpHeader,
    InvalidHttpBody,
    MissSslCertificates,

    UserNotExist,
    UserAlreadyExist,
    RoleNotExist,
    RoleAlreadyExist,
    AuthenticationFailed,
    PermissionDenied,

    // Database errors
    DbNotExist,
    DbAlreadyExist,
    DbTooManyTables,
    DbNotEmpty,

    // Table errors
    InvalidTableSchema,
    InvalidPartitionParameters,
    TableTooManyFields,
    TableTooManyFamilies,
    TableTooManyPrimaryKeys,
    TableTooManyPartitionKeys,
    TableTooManyVectorFields,
    TableTooManyIndexes,
    DynamicSchemaError,
    TableNotExist,
    TableAlreadyExist,
    InvalidTableState,
    TableNotReady,
    AliasNotExist,
    AliasAlreadyExist,

    // Field errors
    FieldNotExist,
    FieldAlreadyExist,
    VectorFieldNotExist,

    // Index errors
    InvalidIndexSchema,
    IndexNotExist,
    IndexAlreadyExist,
    IndexDuplicated,
    InvalidIndexState,

    // Row errors
    PrimaryKeyDuplicated,
    RowKeyNotFound,

    /// Code not known to this SDK version. Kept so a new server code never
    /// masks the underlying server error.
    Unknown(i64),
}

impl ServerErrCode {
    /// Numeric wire value of this code.
    pub fn as_i64(self) -> i64 {
        match self {
            ServerErrCode::InternalError => 1,
            ServerErrCode::InvalidParameter => 2,
            ServerErrCode::InvalidHttpUrl => 10,
            ServerErrCode::InvalidHttpHeader => 11,
            ServerErrCode::InvalidHttpBody => 12,
            ServerErrCode::MissSslCertificates => 13,
            ServerErrCode::UserNotExist => 20,
            ServerErrCode::UserAlreadyExist => 21,
            ServerErrCode::RoleNotExist => 22,
            ServerErrCode::RoleAlreadyExist => 23,
            ServerErrCode::AuthenticationFailed => 24,
            ServerErrCode::PermissionDenied => 25,
            ServerErrCode::DbNotExist => 50,
            ServerErrCode::DbAlreadyExist => 51,
            ServerErrCode::DbTooManyTables => 52,
            ServerErrCode::DbNotEmpty => 53,
            ServerErrCode::InvalidTableSchema => 60,
            ServerErrCode::InvalidPartitionParameters => 61,
            ServerErrCode::TableTooManyFields => 62,
            ServerErrCode::TableTooManyFamilies => 63,
            ServerErrCode::TableTooManyPrimaryKeys => 64,
            ServerErrCode::TableTooManyPartitionKeys => 65,
            ServerErrCode::TableTooManyVectorFields => 66,
            ServerErrCode::TableTooManyIndexes => 67,
            ServerErrCode::DynamicSchemaError => 68,
            ServerErrCode::TableNotExist => 69,
            ServerErrCode::TableAlreadyExist => 70,
            ServerErrCode::InvalidTableState => 71,
            ServerErrCode::TableNotReady => 72,
            ServerErrCode::AliasNotExist => 73,
            ServerErrCode::AliasAlreadyExist => 74,
            ServerErrCode::FieldNotExist => 80,
            ServerErrCode::FieldAlreadyExist => 81,
            ServerErrCode::VectorFieldNotExist => 82,
            ServerErrCode::InvalidIndexSchema => 90,
            ServerErrCode::IndexNotExist => 91,
            ServerErrCode::IndexAlreadyExist => 92,
            ServerErrCode::IndexDuplicated => 93,
            ServerErrCode::InvalidIndexState => 94,
            ServerErrCode::PrimaryKeyDuplicated => 100,
            ServerErrCode::RowKeyNotFound => 101,
            ServerErrCode::Unknown(code) => code,
        }
    }
}

impl From<i64> for ServerErrCode {
    fn from(code: i64) -> Self {
        match code {
            1 => ServerErrCode::InternalError,
            2 => ServerErrCode::InvalidParameter,
            10 => ServerErrCode::InvalidHttpUrl,
            11 => ServerErrCode::InvalidHttpHeader,
            12 => ServerErrCode::InvalidHttpBody,
            13 => ServerErrCode::MissSslCertificates,
            20 => ServerErrCode::UserNotExist,
            21 => ServerErrCode::UserAlreadyExist,
            22 => ServerErrCode::RoleNotExist,
            23 => ServerErrCode::RoleAlreadyExist,
            24 => ServerErrCode::AuthenticationFailed,
            25 => ServerErrCode::PermissionDenied,
            50 => ServerErrCode::DbNotExist,
            51 => ServerErrCode::DbAlreadyExist,
            52 => ServerErrCode::DbTooManyTables,
            53 => ServerErrCode::DbNotEmpty,
            60 => ServerErrCode::InvalidTableSchema,
            61 => ServerErrCode::InvalidPartitionParameters,
            62 => ServerErrCode::TableTooManyFields,
            63 => ServerErrCode::TableTooManyFamilies,
            64 => ServerErrCode::TableTooManyPrimaryKeys,
            65 => ServerErrCode::TableTooManyPartitionKeys,
            66 => ServerErrCode::TableTooManyVectorFields,
            67 => ServerErrCode::TableTooManyIndexes,
            68 => ServerErrCode::DynamicSchemaError,
            69 => ServerErrCode::TableNotExist,
            70 => ServerErrCode::TableAlreadyExist,
            71 => ServerErrCode::InvalidTableState,
            72 => ServerErrCode::TableNotReady,
            73 => ServerErrCode::AliasNotExist,
            74 => ServerErrCode::AliasAlreadyExist,
            80 => ServerErrCode::FieldNotExist,
            81 => ServerErrCode::FieldAlreadyExist,
            82 => ServerErrCode::VectorFieldNotExist,
            90 => ServerErrCode::InvalidIndexSchema,
            91 => ServerErrCode::IndexNotExist,
            92 => ServerErrCode::IndexAlreadyExist,
            93 => ServerErrCode::IndexDuplicated,
            94 => ServerErrCode::InvalidIndexState,
            100 => ServerErrCode::PrimaryKeyDuplicated,
            101 => ServerErrCode::RowKeyNotFound,
            other => ServerErrCode::Unknown(other),
        }
    }
}

impl From<ServerErrCode> for i64 {
    fn from(code: ServerErrCode) -> Self {
        code.as_i64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_roundtrip() {
        for code in [1, 2, 50, 69, 91, 100, 101] {
            assert_eq!(ServerErrCode::from(code).as_i64(), code);
        }
        assert_eq!(ServerErrCode::from(50), ServerErrCode::DbNotExist);
        assert_eq!(ServerErrCode::from(69), ServerErrCode::TableNotExist);
        assert_eq!(ServerErrCode::from(91), ServerErrCode::IndexNotExist);
        assert_eq!(
            ServerErrCode::from(100),
            ServerErrCode::PrimaryKeyDuplicated
        );
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let code = ServerErrCode::from(9999);
        assert_eq!(code, ServerErrCode::Unknown(9999));
        assert_eq!(code.as_i64(), 9999);
    }

    #[test]
    fn test_code_serde_as_integer() {
        let json = serde_json::to_string(&ServerErrCode::TableNotExist).unwrap();
        assert_eq!(json, "69");
        let back: ServerErrCode = serde_json::from_str("69").unwrap();
        assert_eq!(back, ServerErrCode::TableNotExist);
    }

    #[test]
    fn test_is_server_code() {
        let err = Error::Server {
            status_code: 400,
            code: Some(ServerErrCode::DbNotExist),
            message: "database not exist".to_string(),
            request_id: None,
        };
        assert!(err.is_server_code(ServerErrCode::DbNotExist));
        assert!(!err.is_server_code(ServerErrCode::TableNotExist));
        assert!(!Error::client("oops").is_server_code(ServerErrCode::DbNotExist));
    }
}
