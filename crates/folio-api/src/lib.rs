//! JSON HTTP surface for Folio's weather backend.

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;

pub use error::{ApiError, ErrorResponse};
pub use router::{api_router, AppState};
