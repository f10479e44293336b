//! Project templates domain module (event-sourced).
//!
//! Reusable project blueprints with a publish lifecycle and download
//! accounting. Deterministic domain logic only (no IO, no HTTP, no storage).

pub mod template;

pub use template::{
    ArchiveTemplate, CreateTemplate, DeleteTemplate, DownloadCount, DownloadRecorded,
    ProjectTemplate, PublishTemplate, RecordDownload, TemplateArchived, TemplateCommand,
    TemplateCreated, TemplateDeleted, TemplateEvent, TemplateId, TemplateMetadataUpdated,
    TemplatePublished, TemplateStatus, UpdateTemplateMetadata,
};
