//! HTTP/JSON surface over the classification service.

mod error;
mod handlers;
mod router;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use handlers::*;
pub use router::create_router;
pub use state::AppState;
