use std::collections::HashMap;

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use dagboek_db::models::{Board, ChangeLogEntry, List, Project, Task, User};
use futures::TryStreamExt;
use mongodb::Database;
use serde::Serialize;
use tracing::debug;

use crate::dao::base::{BaseDao, DaoError, DaoResult};

#[derive(Debug, Serialize)]
pub struct ProgressReport {
    pub tasks_created: u64,
    pub tasks_completed: u64,
    pub tasks_overdue: u64,
    pub tasks_in_progress: u64,
    pub member_stats: Vec<MemberStats>,
    pub pie_chart: PieChart,
    pub bar_chart: Vec<DayCount>,
    pub burndown: Vec<BurndownPoint>,
    pub changelog: Vec<ChangeLogEntry>,
}

#[derive(Debug, Serialize)]
pub struct MemberStats {
    pub user: ObjectId,
    pub name: String,
    pub tasks_assigned: u64,
    pub tasks_completed: u64,
}

#[derive(Debug, Default, Serialize)]
pub struct PieChart {
    pub done: u64,
    pub to_do: u64,
    pub in_progress: u64,
}

#[derive(Debug, Serialize)]
pub struct DayCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct BurndownPoint {
    pub date: String,
    pub remaining: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub projects: u64,
    pub tasks_open: u64,
    pub tasks_completed: u64,
    pub tasks_overdue: u64,
    pub recent_changelog: Vec<ChangeLogEntry>,
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_report_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Pushes a date to the last millisecond of its UTC day.
fn end_of_day(date: DateTime<Utc>) -> DateTime<Utc> {
    date.date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
        .unwrap_or(date)
}

pub struct ReportService {
    tasks: BaseDao<Task>,
    lists: BaseDao<List>,
    boards: BaseDao<Board>,
    projects: BaseDao<Project>,
    users: BaseDao<User>,
    change_log: BaseDao<ChangeLogEntry>,
}

impl ReportService {
    pub fn new(db: &Database) -> Self {
        Self {
            tasks: BaseDao::new(db, Task::COLLECTION),
            lists: BaseDao::new(db, List::COLLECTION),
            boards: BaseDao::new(db, Board::COLLECTION),
            projects: BaseDao::new(db, Project::COLLECTION),
            users: BaseDao::new(db, User::COLLECTION),
            change_log: BaseDao::new(db, ChangeLogEntry::COLLECTION),
        }
    }

    /// Builds the progress report as a sequence of independent counts and
    /// one per-day aggregation; nothing is cached between requests.
    pub async fn progress_report(
        &self,
        project_id: ObjectId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DaoResult<ProgressReport> {
        let end = end.map(end_of_day);
        debug!(%project_id, ?start, ?end, "Generating progress report");

        let project = self
            .projects
            .find_one(doc! { "_id": project_id })
            .await?
            .ok_or(DaoError::NotFound)?;

        let boards = self
            .boards
            .find_many(doc! { "project": project_id }, None)
            .await?;
        let board_ids: Vec<ObjectId> = boards.iter().filter_map(|b| b.id).collect();

        let base_query = doc! { "board": { "$in": &board_ids } };
        let optional_list_ids = self.list_ids_named(&board_ids, "Optional").await?;

        let mut window = Document::new();
        if let Some(start) = start {
            window.insert("$gte", bson::DateTime::from_chrono(start));
        }
        if let Some(end) = end {
            window.insert("$lte", bson::DateTime::from_chrono(end));
        }

        let tasks_created = if window.is_empty() {
            self.tasks.count(base_query.clone()).await?
        } else {
            let mut query = base_query.clone();
            query.insert("created_at", window.clone());
            self.tasks.count(query).await?
        };

        let tasks_completed = if window.is_empty() {
            let mut query = base_query.clone();
            query.insert("completed_at", doc! { "$ne": null });
            self.tasks.count(query).await?
        } else {
            let mut query = base_query.clone();
            query.insert("completed_at", window.clone());
            self.tasks.count(query).await?
        };

        let mut overdue_query = base_query.clone();
        overdue_query.insert("due_date", doc! { "$lt": bson::DateTime::now() });
        overdue_query.insert("completed_at", bson::Bson::Null);
        let tasks_overdue = self.tasks.count(overdue_query).await?;

        let mut in_progress_query = base_query.clone();
        in_progress_query.insert("list", doc! { "$nin": &optional_list_ids });
        in_progress_query.insert("completed_at", bson::Bson::Null);
        let tasks_in_progress = self.tasks.count(in_progress_query).await?;

        let member_stats = self
            .member_stats(&project, &base_query, &window)
            .await?;

        let mut pie_chart = PieChart::default();
        let mut bar_chart = Vec::new();
        let mut burndown = Vec::new();

        if let (Some(start), Some(end)) = (start, end) {
            pie_chart = self
                .pie_chart(&base_query, &window, &board_ids, &optional_list_ids)
                .await?;
            bar_chart = self.completions_per_day(&base_query, start, end).await?;
            burndown = self
                .burndown(&base_query, start, end, &bar_chart)
                .await?;
        }

        let changelog = self.reportable_changelog(project_id, start, end).await?;

        Ok(ProgressReport {
            tasks_created,
            tasks_completed,
            tasks_overdue,
            tasks_in_progress,
            member_stats,
            pie_chart,
            bar_chart,
            burndown,
            changelog,
        })
    }

    /// Cross-project summary for one user's dashboard.
    pub async fn dashboard(&self, user_id: ObjectId) -> DaoResult<DashboardReport> {
        let projects = self
            .projects
            .find_many(
                doc! {
                    "status": "active",
                    "$or": [ { "members.user": user_id }, { "user": user_id } ],
                },
                None,
            )
            .await?;
        let project_ids: Vec<ObjectId> = projects.iter().filter_map(|p| p.id).collect();

        if project_ids.is_empty() {
            return Ok(DashboardReport {
                projects: 0,
                tasks_open: 0,
                tasks_completed: 0,
                tasks_overdue: 0,
                recent_changelog: Vec::new(),
            });
        }

        let scope = doc! { "project": { "$in": &project_ids } };

        let mut open_query = scope.clone();
        open_query.insert("completed_at", bson::Bson::Null);
        let tasks_open = self.tasks.count(open_query).await?;

        let mut completed_query = scope.clone();
        completed_query.insert("completed_at", doc! { "$ne": null });
        let tasks_completed = self.tasks.count(completed_query).await?;

        let mut overdue_query = scope.clone();
        overdue_query.insert("due_date", doc! { "$lt": bson::DateTime::now() });
        overdue_query.insert("completed_at", bson::Bson::Null);
        let tasks_overdue = self.tasks.count(overdue_query).await?;

        let mut cursor = self
            .change_log
            .collection()
            .find(scope)
            .sort(doc! { "created_at": -1 })
            .limit(10)
            .await?;
        let mut recent_changelog = Vec::new();
        while let Some(entry) = cursor.try_next().await? {
            recent_changelog.push(entry);
        }

        Ok(DashboardReport {
            projects: project_ids.len() as u64,
            tasks_open,
            tasks_completed,
            tasks_overdue,
            recent_changelog,
        })
    }

    async fn list_ids_named(
        &self,
        board_ids: &[ObjectId],
        name: &str,
    ) -> DaoResult<Vec<ObjectId>> {
        let lists = self
            .lists
            .find_many(doc! { "board": { "$in": board_ids }, "name": name }, None)
            .await?;
        Ok(lists.iter().filter_map(|l| l.id).collect())
    }

    async fn member_stats(
        &self,
        project: &Project,
        base_query: &Document,
        window: &Document,
    ) -> DaoResult<Vec<MemberStats>> {
        let member_ids: Vec<ObjectId> = project.members.iter().map(|m| m.user).collect();
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = self
            .users
            .find_many(doc! { "_id": { "$in": &member_ids } }, None)
            .await?;
        let names: HashMap<ObjectId, String> = users
            .iter()
            .filter_map(|u| u.id.map(|id| (id, u.name.clone())))
            .collect();

        let mut stats = Vec::with_capacity(member_ids.len());
        for member_id in member_ids {
            let mut assigned_query = base_query.clone();
            assigned_query.insert("assignees", member_id);
            let tasks_assigned = self.tasks.count(assigned_query).await?;

            let mut completed_query = base_query.clone();
            completed_query.insert("assignees", member_id);
            if window.is_empty() {
                completed_query.insert("completed_at", doc! { "$ne": null });
            } else {
                completed_query.insert("completed_at", window.clone());
            }
            let tasks_completed = self.tasks.count(completed_query).await?;

            stats.push(MemberStats {
                user: member_id,
                name: names.get(&member_id).cloned().unwrap_or_default(),
                tasks_assigned,
                tasks_completed,
            });
        }
        Ok(stats)
    }

    async fn pie_chart(
        &self,
        base_query: &Document,
        window: &Document,
        board_ids: &[ObjectId],
        optional_list_ids: &[ObjectId],
    ) -> DaoResult<PieChart> {
        let mut done_query = base_query.clone();
        done_query.insert("completed_at", window.clone());
        let done = self.tasks.count(done_query).await?;

        let todo_list_ids = self.list_ids_named(board_ids, "To-Do").await?;

        let mut todo_query = base_query.clone();
        todo_query.insert("created_at", window.clone());
        todo_query.insert("completed_at", bson::Bson::Null);
        todo_query.insert("list", doc! { "$in": &todo_list_ids });
        let to_do = self.tasks.count(todo_query).await?;

        let mut excluded = todo_list_ids;
        excluded.extend_from_slice(optional_list_ids);
        let mut in_progress_query = base_query.clone();
        in_progress_query.insert("created_at", window.clone());
        in_progress_query.insert("completed_at", bson::Bson::Null);
        in_progress_query.insert("list", doc! { "$nin": &excluded });
        let in_progress = self.tasks.count(in_progress_query).await?;

        Ok(PieChart {
            done,
            to_do,
            in_progress,
        })
    }

    async fn completions_per_day(
        &self,
        base_query: &Document,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DaoResult<Vec<DayCount>> {
        let mut match_query = base_query.clone();
        match_query.insert(
            "completed_at",
            doc! {
                "$gte": bson::DateTime::from_chrono(start),
                "$lte": bson::DateTime::from_chrono(end),
            },
        );

        let pipeline = vec![
            doc! { "$match": match_query },
            doc! { "$group": {
                "_id": { "$dateToString": { "format": "%Y-%m-%d", "date": "$completed_at" } },
                "count": { "$sum": 1 },
            } },
            doc! { "$sort": { "_id": 1 } },
            doc! { "$project": { "date": "$_id", "count": 1, "_id": 0 } },
        ];

        let mut cursor = self.tasks.collection().aggregate(pipeline).await?;
        let mut series = Vec::new();
        while let Some(row) = cursor.try_next().await? {
            series.push(DayCount {
                date: row.get_str("date").unwrap_or_default().to_string(),
                count: i64::from(row.get_i32("count").unwrap_or(0)),
            });
        }
        Ok(series)
    }

    /// Day-by-day remaining work: open work at the window start, minus the
    /// cumulative completions looked up from the per-day series.
    async fn burndown(
        &self,
        base_query: &Document,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        completions: &[DayCount],
    ) -> DaoResult<Vec<BurndownPoint>> {
        let start_bson = bson::DateTime::from_chrono(start);
        let end_bson = bson::DateTime::from_chrono(end);

        let mut carried_query = base_query.clone();
        carried_query.insert("created_at", doc! { "$lt": start_bson });
        carried_query.insert("$or", vec![
            doc! { "completed_at": null },
            doc! { "completed_at": { "$gte": start_bson } },
        ]);
        let carried_over = self.tasks.count(carried_query).await?;

        let mut created_query = base_query.clone();
        created_query.insert("created_at", doc! { "$gte": start_bson, "$lte": end_bson });
        let created_in_window = self.tasks.count(created_query).await?;

        let total_work = (carried_over + created_in_window) as i64;
        let per_day: HashMap<&str, i64> = completions
            .iter()
            .map(|d| (d.date.as_str(), d.count))
            .collect();

        let mut points = Vec::new();
        let mut remaining = total_work;
        let mut day = start.date_naive();
        let last = end.date_naive();
        while day <= last {
            let key = day.format("%Y-%m-%d").to_string();
            remaining -= per_day.get(key.as_str()).copied().unwrap_or(0);
            points.push(BurndownPoint {
                date: key,
                remaining,
            });
            day += Duration::days(1);
        }
        Ok(points)
    }

    async fn reportable_changelog(
        &self,
        project_id: ObjectId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DaoResult<Vec<ChangeLogEntry>> {
        let mut filter = doc! { "project": project_id, "include_in_report": true };
        let mut range = Document::new();
        if let Some(start) = start {
            range.insert("$gte", bson::DateTime::from_chrono(start));
        }
        if let Some(end) = end {
            range.insert("$lte", bson::DateTime::from_chrono(end));
        }
        if !range.is_empty() {
            filter.insert("created_at", range);
        }
        self.change_log
            .find_many(filter, Some(doc! { "created_at": 1 }))
            .await
    }
}
