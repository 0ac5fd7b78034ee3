//! Drives one conversational turn from submit to idle.
//!
//! ```text
//! Idle -> Sending -> AwaitingReply -> Revealing -> Idle
//!                          \-> Error -> Idle
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backend::ChatBackend;
use crate::clock::Clock;
use crate::history::HistoryStore;
use crate::render::Renderer;
use crate::reveal::{Reveal, RevealOutcome};
use crate::storage::KeyValueStore;
use crate::surface::{ConversationSurface, InputControls};
use crate::typing::TypingIndicator;
use crate::view::Speaker;

pub const NO_REPLY_TEXT: &str = "No reply from AI";
pub const ERROR_TEXT: &str = "⚠️ Error contacting AI. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
    AwaitingReply,
    Revealing,
    Error,
}

/// How a call to [`Conversation::submit`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Input was empty after trimming
    Ignored,
    /// A turn was already in progress
    Busy,
    Replied(RevealOutcome),
    Failed,
}

/// Shared view of a conversation's progress, usable while a turn is running.
#[derive(Debug, Clone)]
pub struct TurnHandle {
    phase: Rc<Cell<Phase>>,
    cancel: Rc<RefCell<CancellationToken>>,
}

impl TurnHandle {
    fn new() -> Self {
        Self {
            phase: Rc::new(Cell::new(Phase::Idle)),
            cancel: Rc::new(RefCell::new(CancellationToken::new())),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == Phase::Idle
    }

    /// Ask a running reveal to finish immediately.
    pub fn interrupt_reveal(&self) {
        self.cancel.borrow().cancel();
    }

    fn token(&self) -> CancellationToken {
        self.cancel.borrow().clone()
    }

    fn rearm(&self) {
        let mut cancel = self.cancel.borrow_mut();
        if cancel.is_cancelled() {
            *cancel = CancellationToken::new();
        }
    }
}

pub struct Conversation<S, B, K> {
    surface: S,
    backend: B,
    history: HistoryStore<K>,
    renderer: Renderer,
    typing: TypingIndicator,
    reveal: Reveal,
    clock: Box<dyn Clock>,
    handle: TurnHandle,
}

impl<S, B, K> Conversation<S, B, K>
where
    S: ConversationSurface + InputControls,
    B: ChatBackend,
    K: KeyValueStore,
{
    pub fn new(
        surface: S,
        backend: B,
        history: HistoryStore<K>,
        renderer: Renderer,
        reveal: Reveal,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            surface,
            backend,
            history,
            renderer,
            typing: TypingIndicator::new(),
            reveal,
            clock,
            handle: TurnHandle::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.handle.phase()
    }

    pub fn handle(&self) -> TurnHandle {
        self.handle.clone()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Rebuild the view from stored history. Returns the number of messages restored.
    pub fn restore(&mut self) -> usize {
        let restored = self.history.load(&mut self.surface, &mut self.renderer, self.clock.as_ref());
        info!(restored, "conversation restored");
        restored
    }

    /// Empty the view and forget the stored history.
    pub fn clear(&mut self) {
        self.typing.forget();
        if let Err(e) = self.history.clear(&mut self.surface) {
            warn!(error = %e, "failed to remove stored history");
        }
    }

    /// Submit whatever is currently in the input control.
    pub async fn submit_input(&mut self) -> Outcome {
        let input = self.surface.input_value();
        self.submit(&input).await
    }

    pub async fn submit(&mut self, input: &str) -> Outcome {
        if !self.handle.is_idle() {
            debug!(phase = ?self.phase(), "submit rejected, turn in progress");
            return Outcome::Busy;
        }

        let message = input.trim();
        if message.is_empty() {
            return Outcome::Ignored;
        }

        let mut turn = Turn {
            conversation: self,
            completed: false,
        };
        let outcome = turn.run(message).await;
        turn.completed = true;
        outcome
    }

    fn save_history(&self) {
        if let Err(e) = self.history.save(&self.surface) {
            warn!(error = %e, "failed to save chat history");
        }
    }
}

impl<S, B, K> Conversation<S, B, K>
where
    S: ConversationSurface + InputControls,
{
    fn finish_turn(&mut self) {
        self.typing.hide(&mut self.surface);
        self.handle.rearm();
        self.set_phase(Phase::Idle);
        self.surface.set_input_enabled(true);
        self.surface.focus_input();
    }

    fn set_phase(&self, phase: Phase) {
        debug!(from = ?self.handle.phase(), to = ?phase, "phase");
        self.handle.phase.set(phase);
    }
}

/// One submitted message. Dropping it, finished or not, puts the
/// conversation back to idle with the input usable again.
struct Turn<'a, S, B, K>
where
    S: ConversationSurface + InputControls,
{
    conversation: &'a mut Conversation<S, B, K>,
    completed: bool,
}

impl<S, B, K> Turn<'_, S, B, K>
where
    S: ConversationSurface + InputControls,
    B: ChatBackend,
    K: KeyValueStore,
{
    async fn run(&mut self, message: &str) -> Outcome {
        let chat = &mut *self.conversation;

        chat.set_phase(Phase::Sending);
        let now = chat.clock.now_label();
        chat.renderer
            .append_message(&mut chat.surface, Speaker::User, message, Some(now), false);
        chat.save_history();

        chat.surface.clear_input();
        chat.surface.set_input_enabled(false);
        chat.typing.show(&mut chat.surface, &mut chat.renderer);

        chat.set_phase(Phase::AwaitingReply);
        let result = chat.backend.send(message).await;
        chat.typing.hide(&mut chat.surface);

        match result {
            Ok(reply) => {
                chat.set_phase(Phase::Revealing);
                let text = reply.unwrap_or_else(|| NO_REPLY_TEXT.to_string());
                let row = chat
                    .renderer
                    .append_message(&mut chat.surface, Speaker::Bot, "", None, false);

                let token = chat.handle.token();
                let revealed = chat
                    .reveal
                    .run(&mut chat.surface, row, &text, chat.clock.as_ref(), &token)
                    .await;
                chat.save_history();
                Outcome::Replied(revealed)
            }
            Err(e) => {
                chat.set_phase(Phase::Error);
                error!(error = %e, "chat request failed");
                chat.renderer
                    .append_message(&mut chat.surface, Speaker::Bot, ERROR_TEXT, None, false);
                Outcome::Failed
            }
        }
    }
}

impl<S, B, K> Drop for Turn<'_, S, B, K>
where
    S: ConversationSurface + InputControls,
{
    fn drop(&mut self) {
        if !self.completed {
            warn!(phase = ?self.conversation.handle.phase(), "turn abandoned before completion");
        }
        self.conversation.finish_turn();
    }
}
