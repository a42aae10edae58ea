mod support;

use std::sync::atomic::Ordering;

use taskboard::drag::{card_drop, GanttDrag, Grip};
use taskboard::error::Error;
use taskboard::model::TaskPatch;
use taskboard::mutation::TaskCommands;
use taskboard::status::Status;

use support::{controller_over, day, TestBoard};

#[tokio::test]
async fn card_drop_persists_and_keeps_optimistic_state() {
    let board = TestBoard::init();
    let (ctl, gateway) = controller_over(&board).await;

    let source = ctl.store().lock().get("t1").expect("t1").status;
    let patch = card_drop(source, Status::InProgress).expect("patch");
    ctl.update("t1", patch).await.expect("update");

    assert_eq!(
        ctl.store().lock().get("t1").expect("t1").status,
        Status::InProgress
    );
    assert_eq!(gateway.task_update_calls.load(Ordering::SeqCst), 1);

    // The change reached the file too.
    let persisted = board.read_board();
    let t1 = persisted.tasks.iter().find(|t| t.id == "t1").expect("t1");
    assert_eq!(t1.status, Status::InProgress);
}

#[tokio::test]
async fn failed_card_drop_rolls_back_and_does_not_retry() {
    let board = TestBoard::init();
    let (ctl, gateway) = controller_over(&board).await;
    gateway.fail_task_updates.store(true, Ordering::SeqCst);

    let before = ctl.store().lock().get("t1").expect("t1").clone();
    let err = ctl
        .update("t1", TaskPatch::status(Status::Done))
        .await
        .expect_err("update should fail");

    assert!(matches!(err, Error::Persistence(_)));
    // Back on the snapshot, deep-equal, and exactly one attempt was made.
    assert_eq!(ctl.store().lock().get("t1").expect("t1"), &before);
    assert_eq!(gateway.task_update_calls.load(Ordering::SeqCst), 1);

    // The file never saw the change.
    let persisted = board.read_board();
    let t1 = persisted.tasks.iter().find(|t| t.id == "t1").expect("t1");
    assert_eq!(t1.status, Status::Todo);
}

#[tokio::test]
async fn dropping_in_the_same_column_issues_no_call() {
    let board = TestBoard::init();
    let (ctl, gateway) = controller_over(&board).await;

    let source = ctl.store().lock().get("t1").expect("t1").status;
    assert!(card_drop(source, source).is_none());

    // Even an empty patch pushed through the controller is a no-op.
    ctl.update("t1", TaskPatch::default()).await.expect("no-op");
    assert_eq!(gateway.task_update_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn gantt_bar_move_shifts_both_dates_and_persists() {
    let board = TestBoard::init();
    let (ctl, _gateway) = controller_over(&board).await;

    let task = ctl.store().lock().get("t1").expect("t1").clone();
    let mut drag = GanttDrag::grab(&task, Grip::Bar, day(2025, 1, 10)).expect("bar");
    drag.drag_to(day(2025, 1, 12));
    let patch = drag.drop().expect("moved");

    ctl.update("t1", patch).await.expect("update");

    let persisted = board.read_board();
    let t1 = persisted.tasks.iter().find(|t| t.id == "t1").expect("t1");
    assert_eq!(t1.started_at, Some(day(2025, 1, 12)));
    assert_eq!(t1.due_date, Some(day(2025, 1, 17)));
}

#[tokio::test]
async fn failed_bar_move_restores_both_dates() {
    let board = TestBoard::init();
    let (ctl, gateway) = controller_over(&board).await;
    gateway.fail_task_updates.store(true, Ordering::SeqCst);

    let task = ctl.store().lock().get("t1").expect("t1").clone();
    let mut drag = GanttDrag::grab(&task, Grip::DueEdge, day(2025, 1, 15)).expect("bar");
    drag.drag_to(day(2025, 1, 20));
    let patch = drag.drop().expect("moved");

    ctl.update("t1", patch).await.expect_err("should fail");

    let after = ctl.store().lock().get("t1").expect("t1").clone();
    assert_eq!(after.started_at, Some(day(2025, 1, 10)));
    assert_eq!(after.due_date, Some(day(2025, 1, 15)));
}

#[tokio::test]
async fn rollback_wakes_store_subscribers() {
    let board = TestBoard::init();
    let (ctl, gateway) = controller_over(&board).await;
    gateway.fail_task_updates.store(true, Ordering::SeqCst);

    let rx = ctl.store().lock().subscribe();
    let seen = *rx.borrow();

    ctl.update("t1", TaskPatch::status(Status::Review))
        .await
        .expect_err("should fail");

    // Merge and revert each bumped the revision; a renderer re-reads and
    // ends up drawing the original state.
    assert!(*rx.borrow() >= seen + 2);
}

#[tokio::test]
async fn delete_is_confirmed_not_optimistic() {
    let board = TestBoard::init();
    let (ctl, gateway) = controller_over(&board).await;
    gateway.fail_task_updates.store(true, Ordering::SeqCst);

    ctl.delete("t3").await.expect_err("should fail");
    // The task is still present: nothing was removed before confirmation.
    assert!(ctl.store().lock().get("t3").is_some());

    gateway.fail_task_updates.store(false, Ordering::SeqCst);
    ctl.delete("t3").await.expect("delete");
    assert!(ctl.store().lock().get("t3").is_none());
    assert!(!board.read_board().tasks.iter().any(|t| t.id == "t3"));
}
