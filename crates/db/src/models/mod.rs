pub mod attachment;
pub mod board;
pub mod change_log;
pub mod diagram;
pub mod error_report;
pub mod folder;
pub mod label;
pub mod list;
pub mod note;
pub mod notification;
pub mod project;
pub mod site_settings;
pub mod snippet;
pub mod task;
pub mod time_entry;
pub mod user;

pub use attachment::Attachment;
pub use board::Board;
pub use change_log::{ChangeLogEntry, ChangeLogType};
pub use diagram::Diagram;
pub use error_report::{ErrorReport, ErrorSeverity, ErrorStatus};
pub use folder::Folder;
pub use label::Label;
pub use list::List;
pub use note::Note;
pub use notification::{Notification, NotificationStatus, NotificationType};
pub use project::{MemberRole, Project, ProjectMember, ProjectStatus};
pub use site_settings::SiteSettings;
pub use snippet::CodeSnippet;
pub use task::{ChecklistItem, Task, TaskAction, TaskActivity, TaskComment, TaskPriority};
pub use time_entry::TimeEntry;
pub use user::{User, UserRole, UserStatus};
