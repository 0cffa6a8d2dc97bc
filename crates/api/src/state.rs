use dagboek_config::Settings;
use dagboek_services::{
    AuthService, ReportService,
    dao::{
        activity::ActivityDao, board::BoardDao, change_log::ChangeLogDao, diagram::DiagramDao,
        error_report::ErrorReportDao, folder::FolderDao, label::LabelDao, list::ListDao,
        note::NoteDao, notification::NotificationDao, project::ProjectDao,
        site_settings::SiteSettingsDao, snippet::SnippetDao, task::TaskDao,
        time_entry::TimeEntryDao, user::UserDao,
    },
};
use mongodb::Database;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub projects: Arc<ProjectDao>,
    pub boards: Arc<BoardDao>,
    pub lists: Arc<ListDao>,
    pub tasks: Arc<TaskDao>,
    pub labels: Arc<LabelDao>,
    pub notes: Arc<NoteDao>,
    pub folders: Arc<FolderDao>,
    pub snippets: Arc<SnippetDao>,
    pub diagrams: Arc<DiagramDao>,
    pub error_reports: Arc<ErrorReportDao>,
    pub change_log: Arc<ChangeLogDao>,
    pub notifications: Arc<NotificationDao>,
    pub time_entries: Arc<TimeEntryDao>,
    pub site_settings: Arc<SiteSettingsDao>,
    pub activities: Arc<ActivityDao>,
    pub reports: Arc<ReportService>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let users = Arc::new(UserDao::new(&db));
        let projects = Arc::new(ProjectDao::new(&db));
        let boards = Arc::new(BoardDao::new(&db));
        let lists = Arc::new(ListDao::new(&db));
        let tasks = Arc::new(TaskDao::new(&db));
        let labels = Arc::new(LabelDao::new(&db));
        let notes = Arc::new(NoteDao::new(&db));
        let folders = Arc::new(FolderDao::new(&db));
        let snippets = Arc::new(SnippetDao::new(&db));
        let diagrams = Arc::new(DiagramDao::new(&db));
        let error_reports = Arc::new(ErrorReportDao::new(&db));
        let change_log = Arc::new(ChangeLogDao::new(&db));
        let notifications = Arc::new(NotificationDao::new(&db));
        let time_entries = Arc::new(TimeEntryDao::new(&db));
        let site_settings = Arc::new(SiteSettingsDao::new(&db));
        let activities = Arc::new(ActivityDao::new(&db));
        let reports = Arc::new(ReportService::new(&db));

        Self {
            db,
            settings,
            auth,
            users,
            projects,
            boards,
            lists,
            tasks,
            labels,
            notes,
            folders,
            snippets,
            diagrams,
            error_reports,
            change_log,
            notifications,
            time_entries,
            site_settings,
            activities,
            reports,
        }
    }
}
