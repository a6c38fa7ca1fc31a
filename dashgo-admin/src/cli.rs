//! Command-line front end
//!
//! Each command drives the same message runtime the screens use: it
//! dispatches the messages a user would trigger, waits for the runtime to go
//! idle, then reports from state.

use std::fmt::Write as _;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dashgo_model::prelude::UsersPage;

use crate::app::{AppConfig, Runtime, base_state};
use crate::domains::user_management::form::{CreateUserForm, Field, SubmissionStatus};
use crate::domains::user_management::messages::Message;

/// Exit status when the form did not pass validation
pub const EXIT_INVALID: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "dashgo-admin", about = "dashgo user administration")]
pub struct Cli {
    /// API base URL (overrides DASHGO_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Use an in-memory user store instead of the API
    #[arg(long, global = true)]
    pub offline: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// Print one page of users
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Create a user through the validated form
    Create {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value = "")]
        password_confirmation: String,
    },
}

impl Cli {
    /// Apply command-line overrides on top of the environment config
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(api_url) = &self.api_url {
            config = config.with_api_url(api_url.clone());
        }
        if self.offline {
            config = config.with_test_stubs(true);
        }
        config
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> Result<ExitCode> {
    let config = cli.apply(config);
    let state = base_state(&config).context("failed to set up the API client")?;
    let mut runtime = Runtime::new(state);

    match cli.command {
        Command::Users(UsersCommand::List { page }) => list_users(&mut runtime, page).await,
        Command::Users(UsersCommand::Create {
            name,
            email,
            password,
            password_confirmation,
        }) => {
            let values = [
                (Field::Name, name),
                (Field::Email, email),
                (Field::Password, password),
                (Field::PasswordConfirmation, password_confirmation),
            ];
            create_user(&mut runtime, values).await
        }
    }
}

async fn list_users(runtime: &mut Runtime, page: u32) -> Result<ExitCode> {
    runtime.dispatch(Message::LoadUsers(page));
    runtime.run_until_idle().await;

    let list = &runtime.state().domains.user_management.state.user_list;
    if let Some(error) = &list.error {
        anyhow::bail!("failed to load users: {error}");
    }
    let page = list
        .page
        .as_ref()
        .context("no users page was loaded")?;

    print!("{}", render_users(page));
    Ok(ExitCode::SUCCESS)
}

async fn create_user(
    runtime: &mut Runtime,
    values: impl IntoIterator<Item = (Field, String)>,
) -> Result<ExitCode> {
    runtime.dispatch(Message::CreateUser);
    for (field, value) in values {
        runtime.dispatch(Message::CreateUserFormUpdate(field, value));
    }
    runtime.dispatch(Message::CreateUserFormSubmit);
    runtime.run_until_idle().await;

    let um = &runtime.state().domains.user_management.state;

    // The form only survives when the redirect did not happen
    if let Some(form) = &um.create_form {
        match form.status() {
            SubmissionStatus::Idle => {
                eprint!("{}", render_field_errors(form));
                return Ok(ExitCode::from(EXIT_INVALID));
            }
            SubmissionStatus::Failed if !form.errors().is_empty() => {
                eprint!("{}", render_field_errors(form));
                return Ok(ExitCode::from(EXIT_INVALID));
            }
            SubmissionStatus::Failed => {
                eprintln!(
                    "Failed to create user: {}",
                    form.failure().unwrap_or("unknown error")
                );
                return Ok(ExitCode::FAILURE);
            }
            SubmissionStatus::Submitting | SubmissionStatus::Succeeded => {}
        }
    }

    let user = um
        .last_created
        .as_ref()
        .context("submission finished without a created user")?;
    println!(
        "Created user {} <{}> (id {}), registered {}",
        user.name,
        user.email,
        user.id,
        user.registration_date()
    );
    Ok(ExitCode::SUCCESS)
}

pub fn render_field_errors(form: &CreateUserForm) -> String {
    let mut out = String::new();
    for error in form.errors().iter() {
        let _ = writeln!(out, "{}: {}", error.field, error.message());
    }
    out
}

/// Plain-text table of a users page
pub fn render_users(page: &UsersPage) -> String {
    let name_width = page
        .users
        .iter()
        .map(|user| user.name.chars().count())
        .chain(std::iter::once("NAME".len()))
        .max()
        .unwrap_or(4);
    let email_width = page
        .users
        .iter()
        .map(|user| user.email.chars().count())
        .chain(std::iter::once("E-MAIL".len()))
        .max()
        .unwrap_or(6);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<name_width$}  {:<email_width$}  REGISTERED",
        "NAME", "E-MAIL"
    );
    for user in &page.users {
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<email_width$}  {}",
            user.name,
            user.email,
            user.registration_date()
        );
    }
    let _ = writeln!(
        out,
        "page {} of {} ({} users)",
        page.request.page,
        page.last_page(),
        page.total_count
    );
    out
}
