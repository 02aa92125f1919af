//! Odolog API
//!
//! HTTP surface of the submission service: session issuance with a scoped
//! upload credential, and verified, exactly-once completion of uploads.

pub mod api_doc;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod verify;

pub use setup::initialize_app;
pub use setup::routes::create_router;
pub use setup::server::start_server;
pub use state::AppState;
