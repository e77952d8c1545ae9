/// Dashboard statistics
///
/// Both dashboards (all tasks for admins, assigned tasks for members) are
/// built from a single grouped query: one row per
/// `(status, priority, past_due)` combination with its task count. The fold
/// into statistics and chart distributions happens here so it can be tested
/// without a database.
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::dashboard::DashboardData;
/// use taskdesk_shared::models::task::TaskScope;
/// use chrono::Utc;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let dashboard = DashboardData::load(&pool, TaskScope::All, Utc::now()).await?;
/// println!("{} overdue", dashboard.statistics.overdue_tasks);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::task::{Task, TaskGroupCount, TaskPriority, TaskScope, TaskStatus};

/// Number of tasks listed under `recentTasks` and `recentCompletedTasks`
pub const RECENT_TASK_LIMIT: i64 = 10;

/// Headline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub all_tasks: i64,
    pub pending_tasks: i64,
    pub completed_tasks: i64,

    /// Not completed and past due
    pub overdue_tasks: i64,
}

/// Tasks per status; keys are `pending`, `in_progress`, `completed`, `all`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusDistribution {
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub all: i64,
}

/// Tasks per priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityLevels {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub task_distribution: StatusDistribution,
    pub task_priority_levels: PriorityLevels,

    /// Same distribution as whole percentages of all tasks
    pub task_distribution_percent: StatusDistribution,
    pub task_priority_percent: PriorityLevels,
}

/// Compact task entry for the recent lists
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTask {
    pub id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

impl RecentTask {
    fn from_task(task: Task, with_assignee: bool) -> Self {
        Self {
            id: task.id,
            title: task.title,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            assigned_to: if with_assignee { task.assigned_to } else { None },
            created_at: task.created_at,
        }
    }
}

/// Full dashboard payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub statistics: Statistics,
    pub charts: Charts,
    pub recent_tasks: Vec<RecentTask>,
    pub recent_completed_tasks: Vec<RecentTask>,
}

impl DashboardData {
    /// Builds the dashboard from grouped counts and the two recent lists
    pub fn build(groups: &[TaskGroupCount], recent: Vec<Task>, recent_completed: Vec<Task>) -> Self {
        let (statistics, charts) = aggregate(groups);

        Self {
            statistics,
            charts,
            recent_tasks: recent
                .into_iter()
                .map(|task| RecentTask::from_task(task, false))
                .collect(),
            recent_completed_tasks: recent_completed
                .into_iter()
                .map(|task| RecentTask::from_task(task, true))
                .collect(),
        }
    }

    /// Queries and assembles the dashboard for a scope
    pub async fn load(
        pool: &PgPool,
        scope: TaskScope,
        now: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let groups = Task::group_counts(pool, scope, now).await?;
        let recent = Task::recent(pool, scope, None, Some(RECENT_TASK_LIMIT)).await?;
        let recent_completed = Task::recent(
            pool,
            scope,
            Some(TaskStatus::Completed),
            Some(RECENT_TASK_LIMIT),
        )
        .await?;

        Ok(Self::build(&groups, recent, recent_completed))
    }
}

/// Folds grouped rows into statistics and chart counts
pub fn aggregate(groups: &[TaskGroupCount]) -> (Statistics, Charts) {
    let mut statistics = Statistics::default();
    let mut distribution = StatusDistribution::default();
    let mut priorities = PriorityLevels::default();

    for group in groups {
        statistics.all_tasks += group.count;

        match group.status {
            TaskStatus::Pending => distribution.pending += group.count,
            TaskStatus::InProgress => distribution.in_progress += group.count,
            TaskStatus::Completed => distribution.completed += group.count,
        }

        match group.priority {
            TaskPriority::Low => priorities.low += group.count,
            TaskPriority::Medium => priorities.medium += group.count,
            TaskPriority::High => priorities.high += group.count,
        }

        if group.past_due && group.status != TaskStatus::Completed {
            statistics.overdue_tasks += group.count;
        }
    }

    statistics.pending_tasks = distribution.pending;
    statistics.completed_tasks = distribution.completed;
    distribution.all = statistics.all_tasks;

    let all = statistics.all_tasks;
    let charts = Charts {
        task_distribution: distribution,
        task_priority_levels: priorities,
        task_distribution_percent: StatusDistribution {
            pending: percent_of(distribution.pending, all),
            in_progress: percent_of(distribution.in_progress, all),
            completed: percent_of(distribution.completed, all),
            all: percent_of(all, all),
        },
        task_priority_percent: PriorityLevels {
            low: percent_of(priorities.low, all),
            medium: percent_of(priorities.medium, all),
            high: percent_of(priorities.high, all),
        },
    };

    (statistics, charts)
}

/// Whole percentage rounded half up; 0 when there is nothing to divide
fn percent_of(count: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }

    (200 * count + total) / (2 * total)
}
