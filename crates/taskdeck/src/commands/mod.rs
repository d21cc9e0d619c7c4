use std::io::Write;

use anyhow::{Result, bail};
use taskdeck_app::{AppContext, Navigation, RemoteApi, TaskStore, View};
use taskdeck_core::{StatusFilter, Task, TaskDraft};
use taskdeck_store::KeyValueStore;

use crate::{Command, LsFormat};

/// Execute one CLI command against the application context.
pub async fn run<A, S, P, W>(command: Command, context: &AppContext<A, S, P>, out: &mut W) -> Result<()>
where
    A: RemoteApi + Clone,
    S: KeyValueStore,
    P: KeyValueStore,
    W: Write,
{
    match command {
        Command::Login { email, password } => handle_login(context, &email, &password, out).await,
        Command::Logout => handle_logout(context, out).await,
        Command::Add { title, due } => handle_add(context, &title, &due, out).await,
        Command::Toggle { id } => handle_toggle(context, &id, out).await,
        Command::Delete { id } => handle_delete(context, &id, out).await,
        Command::Ls { status, format } => handle_ls(context, status, format, out),
        Command::Status => handle_status(context, out),
    }
}

async fn handle_login<A, S, P, W>(
    context: &AppContext<A, S, P>,
    email: &str,
    password: &str,
    out: &mut W,
) -> Result<()>
where
    A: RemoteApi + Clone,
    S: KeyValueStore,
    P: KeyValueStore,
    W: Write,
{
    if let Navigation::Redirect(_) = context.navigate(View::Home)? {
        writeln!(out, "Already signed in.")?;
        return Ok(());
    }
    context.auth()?.login(email, password).await?;
    writeln!(out, "Signed in as {email}.")?;
    Ok(())
}

async fn handle_logout<A, S, P, W>(context: &AppContext<A, S, P>, out: &mut W) -> Result<()>
where
    A: RemoteApi + Clone,
    S: KeyValueStore,
    P: KeyValueStore,
    W: Write,
{
    context.auth()?.logout().await?;
    writeln!(out, "Signed out.")?;
    Ok(())
}

async fn handle_add<A, S, P, W>(
    context: &AppContext<A, S, P>,
    title: &str,
    due: &str,
    out: &mut W,
) -> Result<()>
where
    A: RemoteApi + Clone,
    S: KeyValueStore,
    P: KeyValueStore,
    W: Write,
{
    let tasks = task_view(context)?;
    let draft = TaskDraft::parse(title, due)?;
    let task = tasks.add_task(draft.title(), &draft.due_date_string()).await?;
    writeln!(out, "Added task {} (due {})", task.id, task.due_date)?;
    Ok(())
}

async fn handle_toggle<A, S, P, W>(context: &AppContext<A, S, P>, id: &str, out: &mut W) -> Result<()>
where
    A: RemoteApi + Clone,
    S: KeyValueStore,
    P: KeyValueStore,
    W: Write,
{
    match task_view(context)?.toggle_task(id).await? {
        Some(task) => writeln!(
            out,
            "Marked \"{}\" as {}.",
            task.title,
            if task.completed { "completed" } else { "pending" }
        )?,
        None => writeln!(out, "No task with id {id}.")?,
    }
    Ok(())
}

async fn handle_delete<A, S, P, W>(context: &AppContext<A, S, P>, id: &str, out: &mut W) -> Result<()>
where
    A: RemoteApi + Clone,
    S: KeyValueStore,
    P: KeyValueStore,
    W: Write,
{
    match task_view(context)?.delete_task(id).await? {
        Some(task) => writeln!(out, "Deleted \"{}\".", task.title)?,
        None => writeln!(out, "No task with id {id}.")?,
    }
    Ok(())
}

fn handle_ls<A, S, P, W>(
    context: &AppContext<A, S, P>,
    status: StatusFilter,
    format: LsFormat,
    out: &mut W,
) -> Result<()>
where
    A: RemoteApi + Clone,
    S: KeyValueStore,
    P: KeyValueStore,
    W: Write,
{
    let tasks = task_view(context)?.filter_tasks(status);
    match format {
        LsFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&tasks)?)?,
        LsFormat::Table if tasks.is_empty() => match status {
            StatusFilter::All => writeln!(out, "No tasks found")?,
            other => writeln!(out, "No {other} tasks")?,
        },
        LsFormat::Table => render_task_table(&tasks, out)?,
    }
    Ok(())
}

fn handle_status<A, S, P, W>(context: &AppContext<A, S, P>, out: &mut W) -> Result<()>
where
    A: RemoteApi + Clone,
    S: KeyValueStore,
    P: KeyValueStore,
    W: Write,
{
    let signed_in = context.auth()?.is_authenticated();
    let view = context.navigate(View::Tasks)?.view();
    writeln!(
        out,
        "{} (view: {view})",
        if signed_in { "Signed in" } else { "Signed out" }
    )?;
    Ok(())
}

/// Task container, provided the session may see the task view.
fn task_view<A, S, P>(context: &AppContext<A, S, P>) -> Result<&TaskStore<A, P>>
where
    A: RemoteApi + Clone,
    S: KeyValueStore,
    P: KeyValueStore,
{
    if let Navigation::Redirect(_) = context.navigate(View::Tasks)? {
        bail!("not signed in; run `taskdeck login` first");
    }
    Ok(context.tasks()?)
}

fn render_task_table<W: Write>(tasks: &[Task], out: &mut W) -> Result<()> {
    let id_width = tasks.iter().map(|task| task.id.as_str().len()).max().unwrap_or(2);
    writeln!(out, "    {:<id_width$}  {:<10}  TITLE", "ID", "DUE")?;
    for task in tasks {
        let mark = if task.completed { "[x]" } else { "[ ]" };
        writeln!(
            out,
            "{mark} {:<id_width$}  {:<10}  {}",
            task.id.as_str(),
            task.due_date,
            task.title
        )?;
    }
    Ok(())
}
