//! Shared domain models for the vshare backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video records and the publication state machine
//! - Author info attached to video listings
//! - Upload constraints (allowed formats, size limits)
//! - Pagination envelopes

pub mod page;
pub mod upload;
pub mod video;

pub use page::{clamp_pagination, Page, MAX_PAGE};
pub use upload::{validate_format, validate_size, UploadValidationError, ALLOWED_FORMATS, MAX_UPLOAD_BYTES};
pub use video::{AuthorBrief, Video, VideoId, VideoStatus};
