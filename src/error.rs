use thiserror::Error;

use crate::types::MapId;

#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error {
    #[from]
    pub kind: ErrorKind,
}

#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("Invalid map record: map={map_id:?}, reason={reason}")]
    InvalidRecord { map_id: String, reason: String },
    #[error("Map already registered: {0}")]
    DuplicateMapId(MapId),
    #[error("Unknown map: {0}")]
    UnknownMap(String),
    #[error("Invalid input: {detail}")]
    InvalidInput { detail: String },
    #[cfg(feature = "json")]
    #[error("Error deserializing map records from json: {err}")]
    SerdeJson {
        #[from]
        err: serde_json::Error,
    },
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

#[cfg(feature = "json")]
impl std::convert::From<serde_json::Error> for Error {
    fn from(x: serde_json::Error) -> Error {
        Error { kind: x.into() }
    }
}

pub type IResult<T> = Result<T, Error>;

pub fn failure_from_kind(kind: ErrorKind) -> Error {
    Error { kind }
}

pub(crate) fn invalid_record(map_id: &str, reason: impl Into<String>) -> Error {
    failure_from_kind(ErrorKind::InvalidRecord {
        map_id: map_id.to_string(),
        reason: reason.into(),
    })
}

pub(crate) fn invalid_input(detail: impl Into<String>) -> Error {
    failure_from_kind(ErrorKind::InvalidInput {
        detail: detail.into(),
    })
}
