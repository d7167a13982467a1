use crate::app::App;
use crate::ui;
use anyhow::Result;
use crossterm::event::{self, Event};
use padhai::cache::CachedStudyApi;
use padhai::StudyApi;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

use super::action_queue::{channel, Action};
use super::actions::run_action;
use super::views::handle_view_key;

pub async fn run_app<A: StudyApi>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    api: &CachedStudyApi<A>,
) -> Result<()> {
    let (action_tx, mut action_rx) = channel();
    let _ = action_tx.send(Action::LoadRevisions { fresh: true });

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if app.is_loading() {
            app.throbber_state.calc_next();
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                handle_view_key(key, app, &action_tx);
            }
        }

        // One action per frame so loading states get drawn in between.
        if let Ok(action) = action_rx.try_recv() {
            run_action(action, app, api, &action_tx).await;
        }

        if !app.running {
            break;
        }
    }

    Ok(())
}
