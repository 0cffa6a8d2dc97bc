pub mod activity;
pub mod base;
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

pub use activity::ActivityDao;
pub use base::{BaseDao, DaoError, DaoResult};
pub use board::BoardDao;
pub use change_log::ChangeLogDao;
pub use diagram::DiagramDao;
pub use error_report::ErrorReportDao;
pub use folder::FolderDao;
pub use label::LabelDao;
pub use list::ListDao;
pub use note::{NoteDao, NoteFolderFilter};
pub use notification::NotificationDao;
pub use project::ProjectDao;
pub use site_settings::SiteSettingsDao;
pub use snippet::SnippetDao;
pub use task::TaskDao;
pub use time_entry::TimeEntryDao;
pub use user::UserDao;
