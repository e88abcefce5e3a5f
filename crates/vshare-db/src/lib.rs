//! Postgres persistence for video records.
//!
//! Schema lives in `migrations/`; run it with `psql -f` or any
//! migration runner before starting the services.

pub mod error;
pub mod pool;
pub mod video_repo;

pub use error::{DbError, DbResult};
pub use pool::{connect, DbConfig};
pub use video_repo::{VideoFilter, VideoRepository};
