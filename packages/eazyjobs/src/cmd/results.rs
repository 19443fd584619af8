//! Result listing, viewing, deletion and saving

use anyhow::{Context, Result};
use console::style;
use eazyjobs::ResultBadge;

use super::display_date;
use crate::context::AppContext;

pub async fn list(ctx: &AppContext) -> Result<()> {
    let (dashboard, mut rx) = ctx.dashboard()?;
    let loaded = dashboard.load_results().await;
    ctx.flush_events(&mut rx);
    loaded.context("Failed to load results")?;

    let results = dashboard.results().await;
    ctx.print_header(format!("Results ({})", results.len()));
    if results.is_empty() {
        ctx.print_info("No results yet. Start one with `eazyjobs scrape <keyword>`");
        return Ok(());
    }

    for (key, result) in &results {
        let badge = dashboard.badge(key).await;
        let badge = match badge {
            ResultBadge::Completed => style(badge.label()).green(),
            ResultBadge::Failed => style(badge.label()).red(),
            ResultBadge::InProgress => style(badge.label()).yellow(),
        };
        let keyword = if result.keyword.is_empty() {
            key.as_str()
        } else {
            result.keyword.as_str()
        };
        let detail = if result.success {
            format!("{} jobs found", result.total_posts)
        } else {
            result
                .error
                .clone()
                .unwrap_or_else(|| "no jobs found".to_string())
        };
        println!(
            "{:<24} [{}] {} {}",
            style(keyword).bold(),
            badge,
            detail,
            style(display_date(result)).dim()
        );
    }
    Ok(())
}

pub async fn view(ctx: &AppContext, keyword: &str) -> Result<()> {
    let (dashboard, mut rx) = ctx.dashboard()?;
    let viewed = dashboard.view_result(keyword).await;
    ctx.flush_events(&mut rx);
    let view = viewed?;

    ctx.print_header(format!("\"{}\"", view.keyword));
    if !ctx.quiet {
        println!("{} jobs  {}", view.total_posts, style(&view.timestamp).dim());
    }
    for link in &view.links {
        println!("  {link}");
    }
    if view.total_posts as usize > view.links.len() {
        ctx.print_info(format!(
            "Showing {} of {}. `eazyjobs save {}` keeps all of them",
            view.links.len(),
            view.total_posts,
            view.keyword
        ));
    }
    Ok(())
}

pub async fn delete(ctx: &AppContext, keyword: &str) -> Result<()> {
    let (dashboard, mut rx) = ctx.dashboard()?;
    let deleted = dashboard.delete_result(keyword).await;
    ctx.flush_events(&mut rx);
    deleted?;
    Ok(())
}

pub async fn save(ctx: &AppContext, keyword: &str) -> Result<()> {
    let (dashboard, mut rx) = ctx.dashboard()?;
    // Saving works from loaded results only.
    let _ = dashboard.load_results().await;
    let saved = dashboard.save_links(keyword).await;
    ctx.flush_events(&mut rx);
    saved?;
    Ok(())
}

pub async fn stats(ctx: &AppContext) -> Result<()> {
    let (dashboard, mut rx) = ctx.dashboard()?;
    let _ = dashboard.load_results().await;
    let stats = dashboard.load_stats().await;
    ctx.flush_events(&mut rx);
    let stats = stats.context("Failed to load stats")?;

    ctx.print_header("Stats");
    println!("Total scrapes   {}", stats.total_scrapes);
    println!("Total jobs      {}", stats.total_jobs);
    println!("Saved jobs      {}", stats.saved_jobs);
    println!("Active tasks    {}", stats.active_scraping_tasks);
    Ok(())
}

pub async fn keywords(ctx: &AppContext) -> Result<()> {
    ctx.require_user()?;
    let response = ctx
        .client()?
        .list_keywords()
        .await
        .context("Failed to load keywords")?;

    ctx.print_header(format!("Keywords ({})", response.count));
    for keyword in &response.keywords {
        println!("  {keyword}");
    }
    Ok(())
}
