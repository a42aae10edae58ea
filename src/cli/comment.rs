//! Comment command handlers.

use serde_json::json;

use crate::comments::CommentCommands;
use crate::error::{Error, Result};
use crate::events::EventKind;
use crate::model::Comment;
use crate::output::{emit_success, HumanOutput};

use super::board::{context, emit_event, Ctx, Globals};
use super::CommentCommand;

pub(crate) async fn dispatch(globals: &Globals, command: CommentCommand) -> Result<()> {
    match command {
        CommentCommand::List { task } => list(globals, &task).await,
        CommentCommand::Add { task, text } => add(globals, &task, &text).await,
        CommentCommand::Edit {
            task,
            comment,
            text,
        } => edit(globals, &task, &comment, &text).await,
        CommentCommand::Rm { task, comment } => remove(globals, &task, &comment).await,
    }
}

/// Build the controller and pull one task's thread into the store.
async fn thread_context(globals: &Globals, task_id: &str) -> Result<Ctx> {
    let ctx = context(globals).await?;
    ctx.controller.store().lock().require(task_id)?;
    ctx.controller.load_thread(task_id).await?;
    Ok(ctx)
}

async fn list(globals: &Globals, task_id: &str) -> Result<()> {
    let ctx = thread_context(globals, task_id).await?;
    let comments: Vec<Comment> = {
        let store = ctx.controller.store().lock();
        store.thread(task_id).to_vec()
    };

    let mut human = HumanOutput::new(format!(
        "{task_id}: {} comment{}",
        comments.len(),
        if comments.len() == 1 { "" } else { "s" }
    ));
    for comment in &comments {
        let edited = if comment.is_edited { " (edited)" } else { "" };
        human.push_detail(format!(
            "  {}  {}  {}{edited}",
            comment.id, comment.author.name, comment.text
        ));
    }
    emit_success(globals.options, "comment list", &comments, Some(&human))
}

async fn add(globals: &Globals, task_id: &str, text: &str) -> Result<()> {
    let ctx = thread_context(globals, task_id).await?;
    let actor = ctx.controller.user().id.clone();

    let comment = match ctx.controller.add(task_id, text).await {
        Ok(comment) => comment,
        Err(err) => return Err(reverted(globals, &actor, task_id, err)),
    };
    emit_event(
        globals,
        EventKind::CommentAdded,
        &actor,
        json!({ "task_id": task_id, "comment_id": comment.id }),
    )?;

    let mut human = HumanOutput::new(format!("Commented on {task_id}"));
    human.push_summary("comment", comment.id.clone());
    emit_success(globals.options, "comment add", &comment, Some(&human))
}

async fn edit(globals: &Globals, task_id: &str, comment_id: &str, text: &str) -> Result<()> {
    let ctx = thread_context(globals, task_id).await?;
    let actor = ctx.controller.user().id.clone();

    if let Err(err) = ctx.controller.edit(comment_id, text).await {
        return Err(reverted(globals, &actor, task_id, err));
    }
    emit_event(
        globals,
        EventKind::CommentEdited,
        &actor,
        json!({ "task_id": task_id, "comment_id": comment_id }),
    )?;

    let human = HumanOutput::new(format!("Edited comment {comment_id}"));
    emit_success(
        globals.options,
        "comment edit",
        &json!({ "task_id": task_id, "comment_id": comment_id }),
        Some(&human),
    )
}

async fn remove(globals: &Globals, task_id: &str, comment_id: &str) -> Result<()> {
    let ctx = thread_context(globals, task_id).await?;
    let actor = ctx.controller.user().id.clone();

    if let Err(err) = ctx.controller.remove(comment_id).await {
        return Err(reverted(globals, &actor, task_id, err));
    }
    emit_event(
        globals,
        EventKind::CommentDeleted,
        &actor,
        json!({ "task_id": task_id, "comment_id": comment_id }),
    )?;

    let human = HumanOutput::new(format!("Deleted comment {comment_id}"));
    emit_success(
        globals.options,
        "comment rm",
        &json!({ "task_id": task_id, "comment_id": comment_id }),
        Some(&human),
    )
}

/// Emit the rollback event when persistence failed after the optimistic
/// merge, then hand the error back unchanged.
fn reverted(globals: &Globals, actor: &str, task_id: &str, err: Error) -> Error {
    if matches!(err, Error::Persistence(_)) {
        let _ = emit_event(
            globals,
            EventKind::TaskReverted,
            actor,
            json!({ "task_id": task_id, "reason": err.to_string() }),
        );
    }
    err
}
