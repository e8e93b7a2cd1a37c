use actix_web::{
    http::{header, StatusCode},
    HttpResponse,
};
use hicalendar_push_api_structs::ErrorResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PushError {
    #[error("Invalid data provided: Error message: `{0}`")]
    BadClientData(String),
    #[error("Unauthorized request. Error message: `{0}`")]
    Unauthorized(String),
    /// A run could not complete. The message is returned to the caller
    #[error("{0}")]
    RunFailed(String),
    #[error("Upstream request failed. Error message: `{0}`")]
    BadGateway(String),
}

impl actix_web::error::ResponseError for PushError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::BadClientData(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::RunFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .json(ErrorResponse {
                success: false,
                error: self.to_string(),
            })
    }
}
