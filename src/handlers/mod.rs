pub mod orders;

use actix_web::http::header;
use actix_web::HttpRequest;

use crate::domain::order::Identity;
use crate::domain::ports::AuthGate;
use crate::errors::AppError;

/// Extract the bearer credential and ask the authorization gate for a
/// verdict. Endpoints run the pipeline only after this succeeds.
pub(crate) async fn authorize(
    req: &HttpRequest,
    gate: &dyn AuthGate,
) -> Result<Identity, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    gate.authenticate(token).await.map_err(AppError::from)
}
