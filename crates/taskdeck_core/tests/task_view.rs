use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use taskdeck_core::{
    derive_view, is_due_soon, is_due_today, should_highlight_due_soon, Task, TaskFilter, TaskId,
    TaskSort,
};

fn now() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-05-10T09:00:00+02:00").unwrap()
}

fn task(id: &str, due: Option<&str>, created_minute: u32) -> Task {
    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, created_minute, 0).unwrap();
    let datetime = due.map(|value| {
        DateTime::parse_from_rfc3339(value)
            .unwrap()
            .with_timezone(&Utc)
    });
    Task::new(TaskId::new(id), id, datetime, created_at).unwrap()
}

fn due_in(offset: Duration) -> Task {
    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let due = (now() + offset).with_timezone(&Utc);
    Task::new(TaskId::new("due"), "due", Some(due), created_at).unwrap()
}

fn ids(view: &[&Task]) -> Vec<String> {
    view.iter().map(|task| task.id.to_string()).collect()
}

#[test]
fn date_asc_orders_dated_tasks_and_puts_undated_last() {
    let tasks = vec![
        task("none", None, 0),
        task("far", Some("2099-01-01T00:00:00Z"), 1),
        task("near", Some("2024-01-01T00:00:00Z"), 2),
    ];

    let view = derive_view(&tasks, TaskFilter::All, TaskSort::DateAsc, &now());
    assert_eq!(ids(&view), vec!["near", "far", "none"]);
}

#[test]
fn date_desc_still_puts_undated_last() {
    let tasks = vec![
        task("none-a", None, 0),
        task("near", Some("2024-01-01T00:00:00Z"), 1),
        task("none-b", None, 2),
        task("far", Some("2099-01-01T00:00:00Z"), 3),
    ];

    let view = derive_view(&tasks, TaskFilter::All, TaskSort::DateDesc, &now());
    assert_eq!(ids(&view), vec!["far", "near", "none-a", "none-b"]);
}

#[test]
fn created_orders_sort_by_creation_instant() {
    let tasks = vec![
        task("second", None, 20),
        task("first", None, 10),
        task("third", None, 30),
    ];

    let asc = derive_view(&tasks, TaskFilter::All, TaskSort::CreatedAsc, &now());
    assert_eq!(ids(&asc), vec!["first", "second", "third"]);

    let desc = derive_view(&tasks, TaskFilter::All, TaskSort::CreatedDesc, &now());
    assert_eq!(ids(&desc), vec!["third", "second", "first"]);
}

#[test]
fn equal_due_dates_keep_insertion_order() {
    let tasks = vec![
        task("b", Some("2024-06-01T10:00:00Z"), 0),
        task("a", Some("2024-06-01T10:00:00Z"), 1),
        task("c", Some("2024-06-01T10:00:00Z"), 2),
    ];

    let view = derive_view(&tasks, TaskFilter::All, TaskSort::DateAsc, &now());
    assert_eq!(ids(&view), vec!["b", "a", "c"]);
}

#[test]
fn unrecognized_sort_keeps_filtered_storage_order() {
    let mut tasks = vec![
        task("late", Some("2099-01-01T00:00:00Z"), 0),
        task("undated", None, 1),
        task("early", Some("2024-01-01T00:00:00Z"), 2),
    ];
    tasks[1].completed = true;

    let view = derive_view(
        &tasks,
        TaskFilter::Active,
        TaskSort::from_name("byPriority"),
        &now(),
    );
    assert_eq!(ids(&view), vec!["late", "early"]);
}

#[test]
fn deriving_a_view_leaves_collection_order_intact() {
    let tasks = vec![
        task("none", None, 0),
        task("far", Some("2099-01-01T00:00:00Z"), 1),
        task("near", Some("2024-01-01T00:00:00Z"), 2),
    ];
    let before = tasks.clone();

    let _ = derive_view(&tasks, TaskFilter::All, TaskSort::DateDesc, &now());
    assert_eq!(tasks, before);
}

#[test]
fn today_filter_uses_local_calendar_day() {
    let tasks = vec![
        // 23:30 local on the 10th, still the 10th.
        task("late-tonight", Some("2024-05-10T21:30:00Z"), 0),
        // 00:30 local on the 11th, although still the 10th in UTC.
        task("after-midnight", Some("2024-05-10T22:30:00Z"), 1),
        // 01:00 local on the 10th, already the 9th in UTC.
        task("early-morning", Some("2024-05-09T23:00:00Z"), 2),
        task("undated", None, 3),
    ];

    let view = derive_view(&tasks, TaskFilter::Today, TaskSort::DateAsc, &now());
    assert_eq!(ids(&view), vec!["early-morning", "late-tonight"]);
}

#[test]
fn active_and_completed_filters_partition_the_collection() {
    let mut tasks = vec![task("a", None, 0), task("b", None, 1), task("c", None, 2)];
    tasks[1].completed = true;

    let active = derive_view(&tasks, TaskFilter::Active, TaskSort::DateAsc, &now());
    let completed = derive_view(&tasks, TaskFilter::Completed, TaskSort::DateAsc, &now());

    assert_eq!(ids(&active), vec!["a", "c"]);
    assert_eq!(ids(&completed), vec!["b"]);
}

#[test]
fn due_soon_window_is_open_at_now_and_closed_at_24_hours() {
    assert!(is_due_soon(&due_in(Duration::hours(23)), &now()));
    assert!(is_due_soon(&due_in(Duration::hours(24)), &now()));
    assert!(!is_due_soon(&due_in(Duration::hours(25)), &now()));
    assert!(!is_due_soon(&due_in(Duration::hours(-1)), &now()));
    assert!(!is_due_soon(&due_in(Duration::zero()), &now()));
    assert!(!is_due_soon(&task("undated", None, 0), &now()));
}

#[test]
fn due_predicates_ignore_completion_but_highlighting_does_not() {
    let mut soon = due_in(Duration::hours(2));
    soon.completed = true;

    assert!(is_due_soon(&soon, &now()));
    assert!(is_due_today(&soon, &now()));
    assert!(!should_highlight_due_soon(&soon, &now()));

    soon.completed = false;
    assert!(should_highlight_due_soon(&soon, &now()));
}
