pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod uploads;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads_dir = state.settings.uploads.dir.clone();

    // Auth routes
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/me", get(routes::auth::me));

    // User administration (plus self-service profile)
    let user_routes = Router::new()
        .route("/", get(routes::user::list))
        .route("/profile", put(routes::user::update_profile))
        .route("/{user_id}/approve", put(routes::user::approve))
        .route("/{user_id}/block", put(routes::user::block))
        .route("/{user_id}/unblock", put(routes::user::unblock))
        .route("/{user_id}/role", put(routes::user::set_role));

    // Notification routes
    let notification_routes = Router::new()
        .route("/", get(routes::notification::list))
        .route("/read", put(routes::notification::mark_all_read))
        .route("/respond/{notification_id}", put(routes::notification::respond));

    // Project routes (membership, pickers and the progress report live here)
    let project_routes = Router::new()
        .route("/", get(routes::project::list))
        .route("/", post(routes::project::create))
        .route("/{project_id}", get(routes::project::get))
        .route("/{project_id}", put(routes::project::update))
        .route("/{project_id}", delete(routes::project::delete))
        .route("/{project_id}/tasks", get(routes::project::tasks))
        .route("/{project_id}/progress-report", get(routes::report::progress))
        .route("/{project_id}/members", get(routes::member::list))
        .route("/{project_id}/members", post(routes::member::invite))
        .route("/{project_id}/members/{member_id}", put(routes::member::set_role))
        .route("/{project_id}/members/{member_id}", delete(routes::member::remove));

    // Boards under a project
    let project_board_routes = Router::new()
        .route("/", get(routes::board::list))
        .route("/", post(routes::board::create));

    // Board routes
    let board_routes = Router::new()
        .route("/{board_id}", get(routes::board::get))
        .route("/{board_id}", put(routes::board::rename))
        .route("/{board_id}", delete(routes::board::delete))
        .route("/{board_id}/lists", post(routes::list::create))
        .route("/{board_id}/lists/reorder", put(routes::list::reorder));

    // List routes
    let list_routes = Router::new()
        .route("/{list_id}", put(routes::list::rename))
        .route("/{list_id}", delete(routes::list::delete));

    // Task routes (comments, checklist and attachments nested by id)
    let task_routes = Router::new()
        .route("/", post(routes::task::create))
        .route("/{task_id}", get(routes::task::get))
        .route("/{task_id}", put(routes::task::update))
        .route("/{task_id}", delete(routes::task::delete))
        .route("/{task_id}/move", put(routes::task::move_task))
        .route("/{task_id}/complete", put(routes::task::complete))
        .route("/{task_id}/priority", put(routes::task::set_priority))
        .route("/{task_id}/comments", post(routes::task_comment::create))
        .route("/{task_id}/comments/{comment_id}", put(routes::task_comment::update))
        .route("/{task_id}/comments/{comment_id}", delete(routes::task_comment::delete))
        .route("/{task_id}/checklist", post(routes::task_checklist::create))
        .route("/{task_id}/checklist/{item_id}", put(routes::task_checklist::update))
        .route("/{task_id}/checklist/{item_id}", delete(routes::task_checklist::delete))
        .route("/{task_id}/attachments", post(routes::task_attachment::create))
        .route(
            "/{task_id}/attachments/{attachment_id}",
            delete(routes::task_attachment::delete),
        );

    // Label routes
    let project_label_routes = Router::new()
        .route("/", get(routes::label::list))
        .route("/", post(routes::label::create));
    let label_routes = Router::new()
        .route("/{label_id}", put(routes::label::update))
        .route("/{label_id}", delete(routes::label::delete));
    let admin_label_routes = Router::new()
        .route("/", get(routes::label::admin_list))
        .route("/", post(routes::label::admin_create))
        .route("/{label_id}", put(routes::label::admin_update))
        .route("/{label_id}", delete(routes::label::admin_delete));

    // Note routes
    let project_note_routes = Router::new()
        .route("/", get(routes::note::list))
        .route("/", post(routes::note::create));
    let note_routes = Router::new()
        .route("/upload", post(routes::note::upload_image))
        .route("/{note_id}", put(routes::note::update))
        .route("/{note_id}", delete(routes::note::delete));

    // Folder routes
    let project_folder_routes = Router::new()
        .route("/", get(routes::folder::list))
        .route("/", post(routes::folder::create));
    let folder_routes = Router::new()
        .route("/{folder_id}", put(routes::folder::update))
        .route("/{folder_id}", delete(routes::folder::delete));

    // Snippet routes (fully project-scoped)
    let snippet_routes = Router::new()
        .route("/", get(routes::snippet::list))
        .route("/", post(routes::snippet::create))
        .route("/{snippet_id}", get(routes::snippet::get))
        .route("/{snippet_id}", put(routes::snippet::update))
        .route("/{snippet_id}", delete(routes::snippet::delete));

    // Diagram routes
    let project_diagram_routes = Router::new()
        .route("/", get(routes::diagram::list))
        .route("/", post(routes::diagram::create));
    let diagram_routes = Router::new()
        .route("/{diagram_id}", get(routes::diagram::get))
        .route("/{diagram_id}", put(routes::diagram::update))
        .route("/{diagram_id}", delete(routes::diagram::delete));

    // Time tracking routes
    let project_time_entry_routes = Router::new()
        .route("/", get(routes::time_entry::list))
        .route("/", post(routes::time_entry::create));
    let time_entry_routes = Router::new()
        .route("/{entry_id}", put(routes::time_entry::update))
        .route("/{entry_id}", delete(routes::time_entry::delete));

    // Error report routes
    let project_error_routes = Router::new()
        .route("/", get(routes::error_report::list))
        .route("/", post(routes::error_report::create));
    let error_routes = Router::new()
        .route("/{report_id}", put(routes::error_report::update))
        .route("/{report_id}/attachments", post(routes::error_report::add_attachment))
        .route(
            "/{report_id}/attachments/{attachment_id}",
            delete(routes::error_report::delete_attachment),
        );

    // Changelog routes
    let project_changelog_routes = Router::new()
        .route("/", get(routes::change_log::list))
        .route("/", post(routes::change_log::create));
    let changelog_routes = Router::new()
        .route("/{entry_id}", put(routes::change_log::update))
        .route("/{entry_id}", delete(routes::change_log::delete))
        .route("/{entry_id}/toggle-report", put(routes::change_log::toggle_report));

    // Site settings routes
    let settings_routes = Router::new()
        .route("/", get(routes::settings::get))
        .route("/", put(routes::settings::update))
        .route("/upload-logo", post(routes::settings::upload_logo));

    // Compose API
    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/notifications", notification_routes)
        .nest("/projects", project_routes)
        .nest("/projects/{project_id}/boards", project_board_routes)
        .nest("/projects/{project_id}/labels", project_label_routes)
        .nest("/projects/{project_id}/notes", project_note_routes)
        .nest("/projects/{project_id}/folders", project_folder_routes)
        .nest("/projects/{project_id}/snippets", snippet_routes)
        .nest("/projects/{project_id}/diagrams", project_diagram_routes)
        .nest("/projects/{project_id}/time-entries", project_time_entry_routes)
        .nest("/projects/{project_id}/errors", project_error_routes)
        .nest("/projects/{project_id}/changelog", project_changelog_routes)
        .nest("/boards", board_routes)
        .nest("/lists", list_routes)
        .nest("/tasks", task_routes)
        .nest("/labels", label_routes)
        .nest("/admin/labels", admin_label_routes)
        .nest("/notes", note_routes)
        .nest("/folders", folder_routes)
        .nest("/diagrams", diagram_routes)
        .nest("/time-entries", time_entry_routes)
        .nest("/errors", error_routes)
        .nest("/changelog", changelog_routes)
        .nest("/settings", settings_routes)
        .route("/reports/dashboard", get(routes::report::dashboard))
        .route("/health", get(routes::health::check));

    Router::new()
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
