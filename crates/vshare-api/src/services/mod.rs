//! Application services.

pub mod result_applier;
pub mod upload;
pub mod video;

pub use result_applier::ResultApplier;
pub use upload::{UploadInput, UploadService, UploadSummary};
pub use video::VideoService;
