use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taskboard::board::models::Role;
use taskboard::config::{BoardToml, LogFormat};
use taskboard_common::{Priority, TaskStatus};

mod cmd;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version, about = "Kanban task board with atomic drag-and-drop reordering")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to taskboard.toml. Defaults to ./taskboard.toml, then the user config dir.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path. Overrides [server].db_path and TASKBOARD_DB.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Board server URL for board commands. Overrides TASKBOARD_URL.
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// User id to act as. Overrides TASKBOARD_USER.
    #[arg(long, global = true)]
    pub user: Option<i64>,

    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the board server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,

        /// Enable dev mode (CORS permissive)
        #[arg(long)]
        dev: bool,

        /// Open the health page in a browser once the server is up
        #[arg(long)]
        open: bool,
    },
    /// Create the board database without starting the server
    Init,
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage project membership
    Member {
        #[command(subcommand)]
        command: MemberCommands,
    },
    /// Create or delete tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// View or rearrange a board through the server
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    Create { name: String },
    List,
}

#[derive(Subcommand)]
pub enum UserCommands {
    Create {
        name: String,
        /// Grant move permission on every project
        #[arg(long)]
        admin: bool,
    },
}

#[derive(Subcommand)]
pub enum MemberCommands {
    Add {
        #[arg(long)]
        project: i64,
        #[arg(long = "user-id")]
        user_id: i64,
        #[arg(long, default_value = "member")]
        role: Role,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    Create {
        #[arg(long)]
        project: i64,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long)]
        assignee: Option<String>,
        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum BoardCommands {
    Show {
        #[arg(long)]
        project: i64,
    },
    /// Move a task before another task, or to the head of a column
    Move(MoveArgs),
}

#[derive(Args)]
#[command(group(clap::ArgGroup::new("target").required(true).args(["before", "column"])))]
pub struct MoveArgs {
    #[arg(long)]
    pub project: i64,
    #[arg(long)]
    pub task: i64,
    #[arg(long)]
    pub before: Option<i64>,
    #[arg(long)]
    pub column: Option<TaskStatus>,
}

impl Cli {
    /// Config file and environment, then the global flags on top.
    fn resolve_config(&self) -> Result<BoardToml> {
        let mut config = BoardToml::resolve(self.config.as_deref())?;
        if let Some(db) = &self.db {
            config.server.db_path = db.clone();
        }
        if let Some(url) = &self.url {
            config.client.base_url = url.clone();
        }
        if let Some(user) = self.user {
            config.client.user_id = Some(user);
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        Ok(config)
    }
}

fn init_tracing(config: &BoardToml, verbose: bool) {
    let level = if verbose { "debug" } else { config.logging.level.as_str() };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let mut config = cli.resolve_config()?;
    init_tracing(&config, cli.verbose);

    match &cli.command {
        Commands::Serve {
            host,
            port,
            dev,
            open,
        } => {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            config.server.dev_mode |= *dev;
            cmd::cmd_serve(&config, *open).await?;
        }
        Commands::Init => cmd::cmd_init(&config.server.db_path)?,
        Commands::Project { command } => match command {
            ProjectCommands::Create { name } => cmd::cmd_project_create(&config, name)?,
            ProjectCommands::List => cmd::cmd_project_list(&config)?,
        },
        Commands::User { command } => match command {
            UserCommands::Create { name, admin } => cmd::cmd_user_create(&config, name, *admin)?,
        },
        Commands::Member { command } => match command {
            MemberCommands::Add {
                project,
                user_id,
                role,
            } => cmd::cmd_member_add(&config, *project, *user_id, *role)?,
        },
        Commands::Task { command } => match command {
            TaskCommands::Create {
                project,
                title,
                description,
                status,
                priority,
                assignee,
                due,
            } => {
                let task = taskboard::board::models::NewTask {
                    title: title.clone(),
                    description: description.clone(),
                    status: *status,
                    priority: *priority,
                    assigned_user: assignee.clone(),
                    due_date: *due,
                };
                cmd::cmd_task_create(&config, *project, task)?
            }
            TaskCommands::Delete { id } => cmd::cmd_task_delete(&config, *id)?,
        },
        Commands::Board { command } => match command {
            BoardCommands::Show { project } => cmd::cmd_board_show(&config, *project).await?,
            BoardCommands::Move(args) => {
                let target = match (args.before, args.column) {
                    (Some(id), _) => taskboard_common::DropTarget::Task(id),
                    (None, Some(status)) => taskboard_common::DropTarget::Column(status),
                    (None, None) => anyhow::bail!("Either --before or --column is required"),
                };
                cmd::cmd_board_move(&config, args.project, args.task, target).await?
            }
        },
    }

    Ok(())
}
