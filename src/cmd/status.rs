//! `autorun status <dir>`.

use anyhow::Result;
use std::path::PathBuf;

pub fn cmd_status(project_dir: PathBuf) -> Result<()> {
    use autorun::config::Config;
    use autorun::ui::ConsoleUI;

    let config = Config::new(project_dir, false)?;
    let backlog = super::run::load_backlog(&config)?;
    ConsoleUI::new(false).summary(&backlog);
    Ok(())
}
