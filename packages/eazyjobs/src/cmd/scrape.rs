//! Start a scrape and follow it to the end

use anyhow::{bail, Result};
use console::style;
use eazyjobs::PollOutcome;

use crate::context::{print_events, AppContext};

pub async fn run(ctx: &AppContext, keyword: &str, target_posts: Option<u32>) -> Result<()> {
    let (dashboard, rx) = ctx.dashboard()?;
    let printer = tokio::spawn(print_events(rx, ctx.quiet));

    dashboard.refresh().await;
    let target_posts = target_posts.unwrap_or(ctx.config.default_target_posts);
    let submitted = dashboard.submit(keyword, target_posts).await;

    let outcome = match submitted {
        Ok(handle) => {
            ctx.print_info(format!(
                "Checking status every {}s, Ctrl-C to stop watching",
                ctx.config.poll_interval.as_secs_f32()
            ));

            let wait = handle.wait();
            tokio::pin!(wait);
            let mut interrupted = false;
            let outcome = loop {
                tokio::select! {
                    outcome = &mut wait => break outcome,
                    _ = tokio::signal::ctrl_c(), if !interrupted => {
                        interrupted = true;
                        dashboard.cancel_all();
                    }
                }
            };
            Some(outcome)
        }
        Err(_) => None,
    };

    let stats = dashboard.stats().await;
    drop(dashboard);
    let _ = printer.await;

    let Some(outcome) = outcome else {
        bail!("Scrape for \"{}\" was not started", keyword.trim());
    };

    match outcome {
        PollOutcome::Completed => {
            if !ctx.quiet {
                println!(
                    "{} total jobs across {} scrapes. See them with {}",
                    stats.total_jobs,
                    stats.total_scrapes,
                    style(format!("eazyjobs view {}", keyword.trim())).bold()
                );
            }
            Ok(())
        }
        PollOutcome::Failed => bail!("Scrape for \"{}\" failed", keyword.trim()),
        PollOutcome::TransportError(e) => bail!("Lost contact with the scraping service: {e}"),
        PollOutcome::TimedOut => {
            ctx.print_warning("The job may still be running; check `eazyjobs results` later");
            Ok(())
        }
        PollOutcome::Cancelled => {
            ctx.print_warning("Stopped watching; the job keeps running on the service");
            Ok(())
        }
    }
}
