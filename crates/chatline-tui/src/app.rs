//! The event loop: draws the surface and runs conversational turns while
//! keeping the terminal responsive.

use anyhow::Result;
use tracing::{debug, info, warn};

use chatline_core::{
    ChatBackend, Config, Conversation, HistoryStore, KeyValueStore, LocalClock, Outcome, Phase,
    Renderer, Reveal, TurnHandle,
};

use crate::bindings::{self, Action};
use crate::surface::TuiSurface;
use crate::tui::{EventHandler, Tui};
use crate::ui;

pub struct App<B, K> {
    pub should_quit: bool,
    endpoint: String,
    conversation: Conversation<TuiSurface, B, K>,
    // Clones shared with the conversation, usable while a turn holds it
    surface: TuiSurface,
    history: HistoryStore<K>,
    handle: TurnHandle,
}

impl<B, K> App<B, K>
where
    B: ChatBackend,
    K: KeyValueStore + Clone,
{
    pub fn new(config: &Config, backend: B, store: K) -> Self {
        let surface = TuiSurface::new();
        let history = HistoryStore::new(store);
        let conversation = Conversation::new(
            surface.clone(),
            backend,
            history.clone(),
            Renderer::new(config.avatars()),
            Reveal::new(config.reveal_speed()),
            Box::new(LocalClock::new(&config.timestamp_format)),
        );
        let handle = conversation.handle();

        Self {
            should_quit: false,
            endpoint: config.endpoint.clone(),
            conversation,
            surface,
            history,
            handle,
        }
    }

    pub async fn run(&mut self, terminal: &mut Tui, events: &mut EventHandler) -> Result<()> {
        self.conversation.restore();

        while !self.should_quit {
            draw(terminal, &self.surface, &self.handle, &self.endpoint)?;

            tokio::select! {
                event = events.next() => {
                    let Some(event) = event else { break };
                    let action = bindings::action_for(&event, &self.surface.state());
                    match action {
                        Action::Submit => self.run_turn(terminal, events).await?,
                        Action::Clear => self.conversation.clear(),
                        Action::Quit => self.should_quit = true,
                        other => apply_view_action(&self.surface, other),
                    }
                }
                _ = self.surface.changed() => {}
            }
        }

        info!("exiting");
        Ok(())
    }

    /// Drive one submit to completion, still serving redraws, scrolling,
    /// clear and quit in the meantime.
    async fn run_turn(&mut self, terminal: &mut Tui, events: &mut EventHandler) -> Result<()> {
        let surface = self.surface.clone();
        let handle = self.handle.clone();
        let endpoint = self.endpoint.clone();
        let mut quit_requested = false;

        let turn = self.conversation.submit_input();
        tokio::pin!(turn);

        loop {
            draw(terminal, &surface, &handle, &endpoint)?;

            tokio::select! {
                outcome = &mut turn => {
                    match outcome {
                        Outcome::Failed => info!("turn ended with an error row"),
                        other => debug!(outcome = ?other, "turn finished"),
                    }
                    break;
                }
                event = events.next() => {
                    let Some(event) = event else { break };
                    let action = bindings::action_for(&event, &surface.state());
                    match action {
                        Action::Quit => {
                            // A reply being typed out is finished and saved first;
                            // an unanswered request is abandoned.
                            quit_requested = true;
                            if handle.phase() == Phase::Revealing {
                                handle.interrupt_reveal();
                            } else {
                                break;
                            }
                        }
                        Action::Clear => {
                            let mut target = surface.clone();
                            if let Err(e) = self.history.clear(&mut target) {
                                warn!(error = %e, "failed to remove stored history");
                            }
                        }
                        Action::Submit => debug!("submit ignored while a turn is running"),
                        other => apply_view_action(&surface, other),
                    }
                }
                _ = surface.changed() => {}
            }
        }

        if quit_requested {
            self.should_quit = true;
        }
        Ok(())
    }
}

fn draw(terminal: &mut Tui, surface: &TuiSurface, handle: &TurnHandle, endpoint: &str) -> Result<()> {
    let phase = handle.phase();
    terminal.draw(|frame| ui::render(&mut surface.state_mut(), phase, endpoint, frame))?;
    Ok(())
}

/// Actions that only touch the view and input line
fn apply_view_action(surface: &TuiSurface, action: Action) {
    match action {
        Action::ScrollUp(lines) => surface.state_mut().scroll_up(lines),
        Action::ScrollDown(lines) => surface.state_mut().scroll_down(lines),
        Action::Edit(edit) => bindings::apply_edit(&mut surface.state_mut(), edit),
        Action::Tick => surface.state_mut().tick_animation(),
        Action::Nothing => {}
        Action::Submit | Action::Clear | Action::Quit => {}
    }
}
