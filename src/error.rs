use std::fmt;
use std::io;

#[derive(Debug)]
pub enum ServiceError {
    Io(io::Error),
    BadRequest(String),
    NotFound,
    Internal(String),
    Panic(String),
}

impl ServiceError {
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::NotFound => 404,
            ServiceError::Io(_) | ServiceError::Internal(_) | ServiceError::Panic(_) => 500,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Io(err) => write!(f, "IO error: {}", err),
            ServiceError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ServiceError::NotFound => write!(f, "Not found"),
            ServiceError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ServiceError::Panic(msg) => write!(f, "Panic: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ServiceError {
    fn from(err: io::Error) -> Self {
        ServiceError::Io(err)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
