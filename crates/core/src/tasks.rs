//! Comma-delimited task lists.
//!
//! Projects and templates store their task names as a single comma-separated
//! string (e.g. `"Frontend,Backend,Testing"`). These helpers split, clean and
//! re-join that representation.

/// Separator used when storing task lists.
pub const TASK_SEPARATOR: char = ',';

/// Split a stored task list into trimmed, non-empty task names.
///
/// Duplicates (exact match after trimming) are dropped, keeping the first
/// occurrence so the declared order survives.
pub fn parse_tasks(raw: &str) -> Vec<String> {
    let mut tasks: Vec<String> = Vec::new();
    for token in raw.split(TASK_SEPARATOR) {
        let task = token.trim();
        if task.is_empty() || tasks.iter().any(|t| t == task) {
            continue;
        }
        tasks.push(task.to_string());
    }
    tasks
}

/// Normalise a task list to its canonical stored form (`"a,b,c"`).
pub fn normalize_tasks(raw: &str) -> String {
    join_tasks(&parse_tasks(raw))
}

/// Join task names into the stored representation.
pub fn join_tasks<S: AsRef<str>>(tasks: &[S]) -> String {
    tasks
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(&TASK_SEPARATOR.to_string())
}
