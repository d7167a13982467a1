mod app;
mod bootstrap;
mod cli;
mod commands;
mod config;
mod guard;
mod logging;
mod login;
mod runtime;
mod session_store;
mod ui;

use anyhow::{bail, Result};
use app::App;
use clap::Parser;
use cli::{Cli, Commands};
use config::PadhaiConfig;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use guard::{guard, GuardDecision, Route};
use padhai::calendar::ReferenceTime;
use padhai::{ApiError, CachedStudyApi, HttpStudyApi, MemoryStudyApi, StudyApi};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::{info, warn};

const SESSION_EXPIRED: &str = "Session expired. Run `padhai-tui login`.";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::from_filename(".env.padhai").ok();

    let cli = Cli::parse();
    let config = PadhaiConfig::load()?;

    match cli.command {
        Commands::Run => {
            logging::init_file()?;
            run_real_mode(config).await?;
        }
        Commands::Dev => {
            logging::init_file()?;
            run_dev_mode(config).await?;
        }
        Commands::Login => {
            logging::init_stderr();
            let has_session = session_store::load_session()?.is_some();
            if guard(Route::Login, has_session) == GuardDecision::RedirectToDashboard {
                println!("Already logged in. Run `padhai-tui logout` to switch accounts.");
                return Ok(());
            }
            login::run_login(&config).await?;
        }
        Commands::Register => {
            logging::init_stderr();
            login::run_register(&config).await?;
        }
        Commands::Logout => {
            logging::init_stderr();
            if let Some(token) = session_store::load_session()? {
                let api = HttpStudyApi::new(&config.api_url, Some(&token), config.request_timeout())?;
                // The local session goes away even if the backend is unreachable
                if let Err(e) = api.logout().await {
                    warn!(error = %e, "backend logout failed");
                }
            }
            session_store::clear_session()?;
            println!("Logged out.");
        }
        Commands::ConfigPath => {
            let path = PadhaiConfig::ensure_file()?;
            println!("{}", path.display());
        }
        command => {
            logging::init_stderr();
            run_command(command, &config).await?;
        }
    }

    Ok(())
}

fn route_of(command: &Commands) -> Route {
    match command {
        Commands::Revisions { .. } | Commands::Complete { .. } => Route::Calendar,
        Commands::Profile => Route::Profile,
        _ => Route::Subjects,
    }
}

/// Build an authenticated gateway, or explain how to get a session.
fn authenticated_api(route: Route, config: &PadhaiConfig) -> Result<HttpStudyApi> {
    let token = session_store::load_session()?;
    if guard(route, token.is_some()) == GuardDecision::RedirectToLogin {
        bail!("Not logged in. Run `padhai-tui login` first.");
    }
    Ok(HttpStudyApi::new(
        &config.api_url,
        token.as_deref(),
        config.request_timeout(),
    )?)
}

async fn run_command(command: Commands, config: &PadhaiConfig) -> Result<()> {
    let api = authenticated_api(route_of(&command), config)?;
    let reference = ReferenceTime::local_now();
    let mut stdout = io::stdout();
    let out = &mut stdout;

    let result = match command {
        Commands::Revisions { date } => {
            commands::list_revisions(&api, &reference, date.as_deref(), out).await
        }
        Commands::Complete { revision_id } => {
            commands::complete_revision(&api, &revision_id, out).await
        }
        Commands::Subjects => commands::list_subjects(&api, out).await,
        Commands::AddSubject { name } => commands::add_subject(&api, &name, out).await,
        Commands::DeleteSubject { subject_id } => {
            commands::delete_subject(&api, &subject_id, out).await
        }
        Commands::Chapters { subject_id } => {
            commands::list_chapters(&api, &reference, &subject_id, out).await
        }
        Commands::AddChapter { subject_id, name } => {
            commands::add_chapter(&api, &subject_id, &name, out).await
        }
        Commands::Scores {
            subject_id,
            chapter_id,
        } => commands::list_scores(&api, &reference, &subject_id, &chapter_id, out).await,
        Commands::SetScore {
            subject_id,
            chapter_id,
            score,
            deadline,
        } => commands::set_score(&api, &subject_id, &chapter_id, &score, &deadline, out)
            .await
            .map(|_| ()),
        Commands::Profile => commands::profile(&api, &reference, out).await,
        Commands::Run
        | Commands::Dev
        | Commands::Login
        | Commands::Register
        | Commands::Logout
        | Commands::ConfigPath => Ok(()),
    };

    if let Err(e) = &result {
        if e
            .downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_unauthorized)
        {
            session_store::clear_session()?;
            bail!(SESSION_EXPIRED);
        }
    }
    result
}

async fn run_real_mode(config: PadhaiConfig) -> Result<()> {
    let token = match session_store::load_session()? {
        Some(token) => token,
        None => match guard(Route::Dashboard, false) {
            GuardDecision::RedirectToLogin => {
                println!("No session found. Please log in.");
                login::run_login(&config).await?
            }
            _ => bail!("Not logged in"),
        },
    };

    let api = HttpStudyApi::new(&config.api_url, Some(&token), config.request_timeout())?;
    let api = CachedStudyApi::new(api, config.stale_after());
    info!(api_url = %config.api_url, "starting interactive session");

    let expired = run_interactive(&api).await?;
    if expired {
        session_store::clear_session()?;
        println!("{SESSION_EXPIRED}");
    }
    Ok(())
}

async fn run_dev_mode(config: PadhaiConfig) -> Result<()> {
    let reference = ReferenceTime::local_now();
    let api = CachedStudyApi::new(
        MemoryStudyApi::seeded(reference.today().date()),
        config.stale_after(),
    );
    info!("starting interactive session on seeded in-memory data");

    run_interactive(&api).await?;
    Ok(())
}

/// Run the terminal UI. Returns true when the backend rejected the session.
async fn run_interactive<A: StudyApi>(api: &CachedStudyApi<A>) -> Result<bool> {
    let mut app = App::with_clock(ReferenceTime::local_now);
    if bootstrap::initialize_app_state(&mut app, api).await.is_err() {
        return Ok(true);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = runtime::run_app(&mut terminal, &mut app, api).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(app.session_expired)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_commands_map_to_protected_routes() {
        let commands = [
            Commands::Revisions { date: None },
            Commands::Complete {
                revision_id: "r1".to_string(),
            },
            Commands::Subjects,
            Commands::Chapters {
                subject_id: "s1".to_string(),
            },
            Commands::Profile,
        ];
        for command in &commands {
            let route = route_of(command);
            assert_eq!(guard(route, false), GuardDecision::RedirectToLogin);
            assert_eq!(guard(route, true), GuardDecision::Proceed);
        }
    }
}
