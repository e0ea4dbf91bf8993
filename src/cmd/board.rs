//! Board commands that go through the HTTP client: `taskboard board`.

use anyhow::{Context, Result};

use taskboard::client::{BoardController, HttpTransport, MoveOutcome};
use taskboard::config::BoardToml;
use taskboard_common::{DropTarget, TaskId};

fn controller(config: &BoardToml, project_id: i64) -> Result<BoardController<HttpTransport>> {
    let transport = HttpTransport::new(
        &config.client.base_url,
        config.client.user_id,
        config.request_timeout(),
    )?;
    Ok(BoardController::new(transport, project_id).with_submit_timeout(config.request_timeout()))
}

fn print_board(board: &BoardController<HttpTransport>) {
    if let Some(project) = board.project() {
        println!("{}", console::style(&project.name).bold().cyan());
    }
    for column in board.columns() {
        println!(
            "\n{} {}",
            console::style(column.status.as_str()).bold(),
            console::style(format!("({})", column.tasks.len())).dim()
        );
        for task in &column.tasks {
            println!(
                "  {:>4}  {}  {}",
                console::style(task.id).bold(),
                task.title,
                console::style(format!("pos {}", task.position)).dim()
            );
        }
    }
    if !board.can_move() {
        println!(
            "\n{}",
            console::style("Read-only: you cannot move tasks on this board.").yellow()
        );
    }
}

pub async fn cmd_board_show(config: &BoardToml, project_id: i64) -> Result<()> {
    let mut board = controller(config, project_id)?;
    board
        .load()
        .await
        .with_context(|| format!("Failed to load board {}", project_id))?;
    print_board(&board);
    Ok(())
}

pub async fn cmd_board_move(
    config: &BoardToml,
    project_id: i64,
    task_id: TaskId,
    target: DropTarget,
) -> Result<()> {
    let mut board = controller(config, project_id)?;
    board
        .load()
        .await
        .with_context(|| format!("Failed to load board {}", project_id))?;

    if let Err(refusal) = board.begin_drag(task_id, (0.0, 0.0)) {
        anyhow::bail!("{}", refusal);
    }
    match board.drop_on(Some(target)).await {
        Ok(MoveOutcome::Committed { refreshed }) => {
            println!("{} Moved task {}", console::style("✓").green(), task_id);
            if !refreshed {
                println!(
                    "{}",
                    console::style("Board could not be reloaded; showing the local order.").yellow()
                );
            }
            print_board(&board);
        }
        Ok(MoveOutcome::Unchanged) => println!("Task {} is already there.", task_id),
        Ok(MoveOutcome::Cancelled) => anyhow::bail!("No such drop target on this board"),
        Err(e) => {
            println!("  {} {}", console::style("Error:").red().bold(), e.user_message());
            return Err(e.into());
        }
    }
    Ok(())
}
