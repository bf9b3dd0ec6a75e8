//! Task lists and counts built on top of the matcher.
//!
//! `filter_my_tasks` and `count_my_tasks` share one code path so the badge
//! count and the list can never disagree. The team/overdue/completed views
//! are plain status and date checks and do not involve ownership at all.

use chrono::NaiveDate;
use serde::Serialize;

use crate::identity::Identity;
use crate::matcher::{MatchMode, MatchResult, Matcher};
use crate::task::TaskRecord;

/// Active tasks owned by `identity`, using the default matcher.
pub fn filter_my_tasks<'a>(tasks: &'a [TaskRecord], identity: &Identity) -> Vec<&'a TaskRecord> {
    Matcher::default().my_active_tasks(tasks, identity)
}

/// Number of active tasks owned by `identity`, using the default matcher.
pub fn count_my_tasks(tasks: &[TaskRecord], identity: &Identity) -> usize {
    Matcher::default().count_my_tasks(tasks, identity)
}

impl Matcher {
    /// Tasks that match in active mode: owned, not completed, not pending
    /// deletion.
    pub fn my_active_tasks<'a>(
        &self,
        tasks: &'a [TaskRecord],
        identity: &Identity,
    ) -> Vec<&'a TaskRecord> {
        self.select(tasks, identity, MatchMode::Active)
            .into_iter()
            .map(|(task, _)| task)
            .collect()
    }

    pub fn count_my_tasks(&self, tasks: &[TaskRecord], identity: &Identity) -> usize {
        self.my_active_tasks(tasks, identity).len()
    }

    /// Owned tasks together with the reason each one matched.
    pub fn explain_my_tasks<'a>(
        &self,
        tasks: &'a [TaskRecord],
        identity: &Identity,
        mode: MatchMode,
    ) -> Vec<(&'a TaskRecord, MatchResult)> {
        self.select(tasks, identity, mode)
    }

    /// Every live task that is not yet completed.
    pub fn team_tasks<'a>(&self, tasks: &'a [TaskRecord]) -> Vec<&'a TaskRecord> {
        tasks
            .iter()
            .filter(|task| !task.delete_pending && !task.is_completed(self.completed_status()))
            .collect()
    }

    /// Live tasks marked completed.
    pub fn completed_tasks<'a>(&self, tasks: &'a [TaskRecord]) -> Vec<&'a TaskRecord> {
        tasks
            .iter()
            .filter(|task| !task.delete_pending && task.is_completed(self.completed_status()))
            .collect()
    }

    /// Open tasks whose deadline falls before `today`.
    pub fn overdue_tasks<'a>(
        &self,
        tasks: &'a [TaskRecord],
        today: NaiveDate,
    ) -> Vec<&'a TaskRecord> {
        self.team_tasks(tasks)
            .into_iter()
            .filter(|task| task.deadline_date().is_some_and(|deadline| deadline < today))
            .collect()
    }
}

/// Dashboard counters for one user on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub mine: usize,
    pub team: usize,
    pub overdue: usize,
    pub completed: usize,
}

impl TaskSummary {
    pub fn compute(
        matcher: &Matcher,
        tasks: &[TaskRecord],
        identity: &Identity,
        today: NaiveDate,
    ) -> Self {
        Self {
            mine: matcher.count_my_tasks(tasks, identity),
            team: matcher.team_tasks(tasks).len(),
            overdue: matcher.overdue_tasks(tasks, today).len(),
            completed: matcher.completed_tasks(tasks).len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::PersonRef;
    use crate::task::COMPLETED_STATUS;

    fn task(id: &str, status: &str, deadline: Option<&str>) -> TaskRecord {
        let mut task = TaskRecord::new(id);
        task.status = status.to_string();
        task.deadline = deadline.map(str::to_string);
        task
    }

    #[test]
    fn overdue_excludes_completed_and_undated() {
        let tasks = vec![
            task("late", "Đang làm", Some("2026-10-01")),
            task("due-today", "Đang làm", Some("2026-10-15")),
            task("done", COMPLETED_STATUS, Some("2026-09-01")),
            task("undated", "Đang làm", None),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();

        let overdue: Vec<&str> = Matcher::default()
            .overdue_tasks(&tasks, today)
            .into_iter()
            .map(|task| task.id.as_str())
            .collect();
        assert_eq!(overdue, vec!["late"]);
    }

    #[test]
    fn summary_counts_each_view() {
        let mut mine = task("mine", "Đang làm", Some("2026-01-01"));
        mine.assignee = PersonRef::id("U-1");
        let mut deleted = task("deleted", "Đang làm", None);
        deleted.delete_pending = true;
        let tasks = vec![
            mine,
            deleted,
            task("other", "Mới", None),
            task("done", COMPLETED_STATUS, None),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();

        let summary = TaskSummary::compute(
            &Matcher::default(),
            &tasks,
            &Identity::new("U-1", "", ""),
            today,
        );
        assert_eq!(
            summary,
            TaskSummary {
                mine: 1,
                team: 2,
                overdue: 1,
                completed: 1,
            }
        );
    }
}
