//! Sign in, sign out, whoami

use anyhow::{bail, Result};
use console::style;
use dialoguer::{Input, Password};
use eazyjobs::guard::navigate;
use eazyjobs::Route;

use crate::context::AppContext;

pub fn login(ctx: &AppContext, email: Option<String>, password: Option<String>) -> Result<()> {
    let mut session = ctx.session()?;
    if let Some(user) = session.user() {
        ctx.print_info(format!("Already signed in as {}", user.email));
        return Ok(());
    }

    let email = match email {
        Some(email) => email,
        None if ctx.quiet => String::new(),
        None => Input::new()
            .with_prompt("Email")
            .allow_empty(true)
            .interact_text()?,
    };
    let password = match password {
        Some(password) => password,
        None if ctx.quiet => String::new(),
        None => Password::new()
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact()?,
    };

    if email.trim().is_empty() || password.is_empty() {
        bail!("Please fill in all fields");
    }
    if !session.login(email.trim(), &password)? {
        bail!("Invalid credentials");
    }

    ctx.print_success("Welcome to EazyJobs!");
    if navigate(&session, Route::Dashboard.path()) == Route::Dashboard && !ctx.quiet {
        println!(
            "Start a scrape with {}",
            style("eazyjobs scrape <keyword>").bold()
        );
    }
    Ok(())
}

pub fn logout(ctx: &AppContext) -> Result<()> {
    ctx.clear_session()?;
    ctx.print_success("Logged out successfully");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    let user = ctx.require_user()?;
    println!("{} ({})", style(&user.name).bold(), user.email);
    println!("{}", style(&user.role).dim());
    Ok(())
}
