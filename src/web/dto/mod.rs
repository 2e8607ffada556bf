//! Request and response DTOs for the Web API.

mod request;
mod response;

pub use request::{ListFilesQuery, UpdateFileRequest};
pub use response::{
    FileResponse, FileTypeCount, ListFilesResponse, MessageResponse, PaginationMeta,
    RecentFileResponse, StatsResponse, UpdateResponse, UploadResponse,
};
