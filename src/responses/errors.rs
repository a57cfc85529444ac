use crate::errors::ServerError;
use astra::Response;

pub type ResultResp = Result<Response, ServerError>;

/// HTTP status for each error kind.
pub fn status_for(err: &ServerError) -> u16 {
    match err {
        ServerError::NotFound => 404,
        ServerError::BadRequest(_) => 400,
        ServerError::Unauthorized(_) => 401,
        ServerError::Unavailable(_) => 503,
        ServerError::DbError(_) | ServerError::InternalError => 500,
    }
}
