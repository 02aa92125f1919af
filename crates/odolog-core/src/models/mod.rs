//! Domain models and wire types for the submission protocol.

pub mod session;
pub mod submission;
pub mod submission_session;

pub use session::{bucket_path_for, ExpectedUpload, UploadSession};
pub use submission::{GpsPoint, OcrReading, Submission};
pub use submission_session::{
    CompleteSubmissionRequest, CompleteSubmissionResponse, CreateSubmissionSessionRequest,
    CreateSubmissionSessionResponse,
};
