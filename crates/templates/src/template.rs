use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devplan_core::{Aggregate, AggregateId, AggregateRoot, DomainError, UserId, ValueObject};
use devplan_events::Event;

/// Project template identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub AggregateId);

impl TemplateId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Template status lifecycle.
///
/// Draft → Published → Archived | Deleted; Draft and Archived may also be
/// deleted directly. Deleted is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStatus {
    Draft,
    Published,
    Archived,
    Deleted,
}

impl core::fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            TemplateStatus::Draft => "draft",
            TemplateStatus::Published => "published",
            TemplateStatus::Archived => "archived",
            TemplateStatus::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// Number of times a template has been downloaded.
///
/// Only ever moves forward, and only while the template is Published (the
/// aggregate enforces the status guard).
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DownloadCount(u64);

impl DownloadCount {
    pub fn get(&self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl ValueObject for DownloadCount {}

/// Aggregate root: ProjectTemplate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTemplate {
    id: TemplateId,
    name: String,
    description: String,
    author: Option<UserId>,
    status: TemplateStatus,
    downloads: DownloadCount,
    version: u64,
    created: bool,
}

impl ProjectTemplate {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: TemplateId) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            author: None,
            status: TemplateStatus::Draft,
            downloads: DownloadCount::default(),
            version: 0,
            created: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn author(&self) -> Option<UserId> {
        self.author
    }

    pub fn status(&self) -> TemplateStatus {
        self.status
    }

    pub fn downloads(&self) -> DownloadCount {
        self.downloads
    }

    /// Whether the template is visible in the public catalog.
    pub fn is_published(&self) -> bool {
        self.status == TemplateStatus::Published
    }

    fn ensure_created(&self) -> Result<(), DomainError> {
        if self.created {
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }

    fn ensure_not_deleted(&self) -> Result<(), DomainError> {
        if self.status == TemplateStatus::Deleted {
            return Err(DomainError::invariant("template is deleted"));
        }
        Ok(())
    }
}

impl AggregateRoot for ProjectTemplate {
    type Id = TemplateId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Command: create a template in Draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTemplate {
    pub template_id: TemplateId,
    pub name: String,
    pub description: String,
    pub author: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: update name/description (Draft only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTemplateMetadata {
    pub template_id: TemplateId,
    pub name: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: publish a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishTemplate {
    pub template_id: TemplateId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: archive a published template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveTemplate {
    pub template_id: TemplateId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: soft-delete a template (terminal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTemplate {
    pub template_id: TemplateId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: count a download (Published only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDownload {
    pub template_id: TemplateId,
    pub occurred_at: DateTime<Utc>,
}

/// All template commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateCommand {
    Create(CreateTemplate),
    UpdateMetadata(UpdateTemplateMetadata),
    Publish(PublishTemplate),
    Archive(ArchiveTemplate),
    Delete(DeleteTemplate),
    RecordDownload(RecordDownload),
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Event: template created in Draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateCreated {
    pub template_id: TemplateId,
    pub name: String,
    pub description: String,
    pub author: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: metadata updated while in Draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMetadataUpdated {
    pub template_id: TemplateId,
    pub name: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: template published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePublished {
    pub template_id: TemplateId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: template archived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateArchived {
    pub template_id: TemplateId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: template deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDeleted {
    pub template_id: TemplateId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a download was counted.
///
/// Carries the post-increment count so replays stay a plain assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecorded {
    pub template_id: TemplateId,
    pub count: DownloadCount,
    pub occurred_at: DateTime<Utc>,
}

/// All template events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateEvent {
    Created(TemplateCreated),
    MetadataUpdated(TemplateMetadataUpdated),
    Published(TemplatePublished),
    Archived(TemplateArchived),
    Deleted(TemplateDeleted),
    DownloadRecorded(DownloadRecorded),
}

impl Event for TemplateEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TemplateEvent::Created(_) => "templates.template.created",
            TemplateEvent::MetadataUpdated(_) => "templates.template.metadata_updated",
            TemplateEvent::Published(_) => "templates.template.published",
            TemplateEvent::Archived(_) => "templates.template.archived",
            TemplateEvent::Deleted(_) => "templates.template.deleted",
            TemplateEvent::DownloadRecorded(_) => "templates.template.download_recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TemplateEvent::Created(e) => e.occurred_at,
            TemplateEvent::MetadataUpdated(e) => e.occurred_at,
            TemplateEvent::Published(e) => e.occurred_at,
            TemplateEvent::Archived(e) => e.occurred_at,
            TemplateEvent::Deleted(e) => e.occurred_at,
            TemplateEvent::DownloadRecorded(e) => e.occurred_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for ProjectTemplate {
    type Command = TemplateCommand;
    type Event = TemplateEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TemplateEvent::Created(e) => {
                self.id = e.template_id;
                self.name = e.name.clone();
                self.description = e.description.clone();
                self.author = Some(e.author);
                self.status = TemplateStatus::Draft;
                self.created = true;
            }
            TemplateEvent::MetadataUpdated(e) => {
                self.name = e.name.clone();
                self.description = e.description.clone();
            }
            TemplateEvent::Published(_) => self.status = TemplateStatus::Published,
            TemplateEvent::Archived(_) => self.status = TemplateStatus::Archived,
            TemplateEvent::Deleted(_) => self.status = TemplateStatus::Deleted,
            TemplateEvent::DownloadRecorded(e) => self.downloads = e.count,
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            TemplateCommand::Create(cmd) => self.handle_create(cmd),
            TemplateCommand::UpdateMetadata(cmd) => self.handle_update_metadata(cmd),
            TemplateCommand::Publish(cmd) => self.handle_publish(cmd),
            TemplateCommand::Archive(cmd) => self.handle_archive(cmd),
            TemplateCommand::Delete(cmd) => self.handle_delete(cmd),
            TemplateCommand::RecordDownload(cmd) => self.handle_record_download(cmd),
        }
    }
}

impl ProjectTemplate {
    fn validate_metadata(name: &str, description: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("template name cannot be empty"));
        }
        if name.trim().len() > 100 {
            return Err(DomainError::validation("template name too long (max 100)"));
        }
        if description.len() > 2000 {
            return Err(DomainError::validation(
                "template description too long (max 2000)",
            ));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateTemplate) -> Result<Vec<TemplateEvent>, DomainError> {
        if self.created {
            return Err(DomainError::invariant("template already exists"));
        }
        Self::validate_metadata(&cmd.name, &cmd.description)?;

        Ok(vec![TemplateEvent::Created(TemplateCreated {
            template_id: cmd.template_id,
            name: cmd.name.trim().to_string(),
            description: cmd.description.clone(),
            author: cmd.author,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_metadata(
        &self,
        cmd: &UpdateTemplateMetadata,
    ) -> Result<Vec<TemplateEvent>, DomainError> {
        self.ensure_created()?;

        if self.status != TemplateStatus::Draft {
            return Err(DomainError::invariant(format!(
                "only draft templates can be edited (template is {})",
                self.status
            )));
        }
        Self::validate_metadata(&cmd.name, &cmd.description)?;

        Ok(vec![TemplateEvent::MetadataUpdated(TemplateMetadataUpdated {
            template_id: cmd.template_id,
            name: cmd.name.trim().to_string(),
            description: cmd.description.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_publish(&self, cmd: &PublishTemplate) -> Result<Vec<TemplateEvent>, DomainError> {
        self.ensure_created()?;

        if self.status != TemplateStatus::Draft {
            return Err(DomainError::invariant(format!(
                "only draft templates can be published (template is {})",
                self.status
            )));
        }

        Ok(vec![TemplateEvent::Published(TemplatePublished {
            template_id: cmd.template_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_archive(&self, cmd: &ArchiveTemplate) -> Result<Vec<TemplateEvent>, DomainError> {
        self.ensure_created()?;

        if self.status != TemplateStatus::Published {
            return Err(DomainError::invariant(format!(
                "only published templates can be archived (template is {})",
                self.status
            )));
        }

        Ok(vec![TemplateEvent::Archived(TemplateArchived {
            template_id: cmd.template_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_delete(&self, cmd: &DeleteTemplate) -> Result<Vec<TemplateEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_not_deleted()?;

        Ok(vec![TemplateEvent::Deleted(TemplateDeleted {
            template_id: cmd.template_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_download(
        &self,
        cmd: &RecordDownload,
    ) -> Result<Vec<TemplateEvent>, DomainError> {
        self.ensure_created()?;

        if self.status != TemplateStatus::Published {
            return Err(DomainError::invariant(format!(
                "downloads count only while published (template is {})",
                self.status
            )));
        }

        Ok(vec![TemplateEvent::DownloadRecorded(DownloadRecorded {
            template_id: cmd.template_id,
            count: self.downloads.incremented(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
