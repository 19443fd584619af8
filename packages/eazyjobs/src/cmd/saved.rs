//! Saved job links

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use console::style;
use uuid::Uuid;

use super::display_saved_at;
use crate::context::AppContext;

#[derive(Subcommand)]
pub enum SavedCommand {
    /// List saved job links
    List,

    /// Remove a saved job link
    Remove { id: Uuid },

    /// Open a saved job link in the browser
    Open { id: Uuid },
}

pub async fn run(ctx: &AppContext, cmd: SavedCommand) -> Result<()> {
    match cmd {
        SavedCommand::List => list(ctx).await,
        SavedCommand::Remove { id } => remove(ctx, id).await,
        SavedCommand::Open { id } => open_job(ctx, id).await,
    }
}

async fn list(ctx: &AppContext) -> Result<()> {
    let (dashboard, _rx) = ctx.dashboard()?;
    let jobs = dashboard.saved_jobs().await;

    ctx.print_header(format!("Saved jobs ({})", jobs.len()));
    if jobs.is_empty() {
        ctx.print_info("Nothing saved yet. Use `eazyjobs save <keyword>` after a scrape");
        return Ok(());
    }
    for job in &jobs {
        println!("{}  {}", style(job.id).dim(), job.url);
        println!(
            "    {} • {}",
            job.keyword,
            style(display_saved_at(&job.saved_at)).dim()
        );
    }
    Ok(())
}

async fn remove(ctx: &AppContext, id: Uuid) -> Result<()> {
    let (dashboard, mut rx) = ctx.dashboard()?;
    let removed = dashboard.delete_saved_job(id).await;
    ctx.flush_events(&mut rx);
    if !removed? {
        bail!("No saved job with id {id}");
    }
    Ok(())
}

async fn open_job(ctx: &AppContext, id: Uuid) -> Result<()> {
    let (dashboard, _rx) = ctx.dashboard()?;
    let Some(job) = dashboard.saved_job(id).await else {
        bail!("No saved job with id {id}");
    };

    ctx.print_info(format!("Opening {}", job.url));
    open::that(&job.url).with_context(|| format!("Failed to open {}", job.url))?;
    Ok(())
}
