//! Direct database commands for seeding a board: projects, users,
//! memberships and tasks.

use anyhow::{Context, Result};

use taskboard::board::db::BoardDb;
use taskboard::board::models::{NewTask, Role};
use taskboard::config::BoardToml;

fn open_db(config: &BoardToml) -> Result<BoardDb> {
    let path = &config.server.db_path;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    BoardDb::new(path).with_context(|| format!("Failed to open board database {}", path.display()))
}

pub fn cmd_project_create(config: &BoardToml, name: &str) -> Result<()> {
    let project = open_db(config)?.create_project(name)?;
    println!(
        "{} Created project {} {}",
        console::style("✓").green(),
        console::style(project.id).bold(),
        project.name
    );
    Ok(())
}

pub fn cmd_project_list(config: &BoardToml) -> Result<()> {
    let projects = open_db(config)?.list_projects()?;
    if projects.is_empty() {
        println!("{}", console::style("No projects yet.").dim());
        return Ok(());
    }
    for project in projects {
        println!(
            "  {:>4}  {}  {}",
            console::style(project.id).bold(),
            project.name,
            console::style(project.created_at).dim()
        );
    }
    Ok(())
}

pub fn cmd_user_create(config: &BoardToml, name: &str, admin: bool) -> Result<()> {
    let user = open_db(config)?.create_user(name, admin)?;
    let suffix = if user.is_admin { " (admin)" } else { "" };
    println!(
        "{} Created user {} {}{}",
        console::style("✓").green(),
        console::style(user.id).bold(),
        user.name,
        suffix
    );
    Ok(())
}

pub fn cmd_member_add(config: &BoardToml, project_id: i64, user_id: i64, role: Role) -> Result<()> {
    let db = open_db(config)?;
    if db.get_project(project_id)?.is_none() {
        anyhow::bail!("Project {} not found", project_id);
    }
    if db.get_user(user_id)?.is_none() {
        anyhow::bail!("User {} not found", user_id);
    }
    db.add_member(project_id, user_id, role)?;
    println!(
        "{} User {} is now {} of project {}",
        console::style("✓").green(),
        user_id,
        role.as_str(),
        project_id
    );
    Ok(())
}

pub fn cmd_task_create(config: &BoardToml, project_id: i64, task: NewTask) -> Result<()> {
    let db = open_db(config)?;
    if db.get_project(project_id)?.is_none() {
        anyhow::bail!("Project {} not found", project_id);
    }
    let task = db.create_task(project_id, &task)?;
    println!(
        "{} Created task {} in {} at position {}",
        console::style("✓").green(),
        console::style(task.id).bold(),
        task.status,
        task.position
    );
    Ok(())
}

pub fn cmd_task_delete(config: &BoardToml, id: i64) -> Result<()> {
    if !open_db(config)?.delete_task(id)? {
        anyhow::bail!("Task {} not found", id);
    }
    println!("{} Deleted task {}", console::style("✓").green(), id);
    Ok(())
}
