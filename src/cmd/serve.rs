//! Board server commands: `taskboard serve` and `taskboard init`.

use anyhow::Result;
use std::path::Path;

use taskboard::board::db::BoardDb;
use taskboard::board::server;
use taskboard::config::BoardToml;

pub async fn cmd_serve(config: &BoardToml, open: bool) -> Result<()> {
    let server_config = config.server_config();

    if open {
        let url = format!("http://{}:{}/health", server_config.host, server_config.port);
        tokio::spawn(async move {
            // Small delay to let the server start binding
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url) {
                tracing::warn!(error = %e, "failed to open browser");
            }
        });
    }

    server::start_server(server_config).await
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    BoardDb::new(db_path)?;
    println!(
        "{} Board database initialized at {}",
        console::style("✓").green(),
        db_path.display()
    );
    Ok(())
}
