//! Character-by-character disclosure of a reply into an existing bubble.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::clock::Clock;
use crate::sanitize::sanitize;
use crate::surface::ConversationSurface;
use crate::view::{Bubble, RowId};

pub const DEFAULT_SPEED: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Every character was shown at the configured cadence
    Completed,
    /// The token fired; the full text was written immediately
    Interrupted,
    /// The row was removed from the surface before the reveal finished
    Detached,
}

/// A timed sequence of bubble writes.
///
/// The sequence checks its [`CancellationToken`] before every step. Nothing
/// cancels it by default, so a reveal normally runs to completion.
#[derive(Debug, Clone)]
pub struct Reveal {
    speed: Duration,
}

impl Reveal {
    pub fn new(speed: Duration) -> Self {
        Self { speed }
    }

    pub async fn run<S: ConversationSurface + ?Sized>(
        &self,
        surface: &mut S,
        row: RowId,
        text: &str,
        clock: &dyn Clock,
        cancel: &CancellationToken,
    ) -> RevealOutcome {
        let mut outcome = RevealOutcome::Completed;

        for (idx, c) in text.char_indices() {
            if cancel.is_cancelled() {
                outcome = RevealOutcome::Interrupted;
                break;
            }

            let partial = Bubble::Text {
                text: sanitize(&text[..idx + c.len_utf8()]),
                timestamp: None,
                cursor: true,
            };
            if !surface.set_bubble(row, partial) {
                debug!(row = row.0, "reveal target removed, stopping");
                return RevealOutcome::Detached;
            }
            surface.scroll_to_end();

            tokio::select! {
                _ = tokio::time::sleep(self.speed) => {}
                _ = cancel.cancelled() => {
                    outcome = RevealOutcome::Interrupted;
                    break;
                }
            }
        }

        // Timestamp is taken when the reveal ends, not when it started
        let done = Bubble::text(sanitize(text), Some(clock.now_label()));
        if !surface.set_bubble(row, done) {
            return RevealOutcome::Detached;
        }
        surface.scroll_to_end();
        outcome
    }
}

impl Default for Reveal {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::render::Renderer;
    use crate::surface::MemorySurface;
    use crate::view::Speaker;
    use tokio::time::Instant;

    /// Labels each reading with the milliseconds since it was created
    struct ElapsedClock(Instant);

    impl Clock for ElapsedClock {
        fn now_label(&self) -> String {
            self.0.elapsed().as_millis().to_string()
        }
    }

    fn setup() -> (MemorySurface, RowId) {
        let mut surface = MemorySurface::new();
        let mut renderer = Renderer::default();
        let row = renderer.append_message(&mut surface, Speaker::Bot, "", None, false);
        (surface, row)
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_completes_with_timestamp() {
        let (mut surface, row) = setup();
        let clock = FixedClock("12:30".into());
        let start = Instant::now();

        let outcome = Reveal::default()
            .run(&mut surface, row, "Hi there", &clock, &CancellationToken::new())
            .await;

        assert_eq!(outcome, RevealOutcome::Completed);
        assert_eq!(
            surface.view.get(row).unwrap().bubble,
            Bubble::text("Hi there", Some("12:30".into()))
        );
        // 8 characters at 30ms each
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(240), "finished after {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(270), "finished after {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timestamp_taken_at_completion() {
        let (mut surface, row) = setup();
        let clock = ElapsedClock(Instant::now());

        Reveal::new(Duration::from_millis(20))
            .run(&mut surface, row, "Hello", &clock, &CancellationToken::new())
            .await;

        // Five characters at 20ms each; a start-time label would read 0
        let stamped: u128 = surface.view.get(row).unwrap().bubble.timestamp().unwrap().parse().unwrap();
        assert!(stamped >= 100, "stamped at {}ms", stamped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_shows_cursor_mid_way() {
        let (mut surface, row) = setup();
        let clock = FixedClock("12:30".into());
        let reveal = Reveal::new(Duration::from_millis(10));
        let cancel = CancellationToken::new();

        {
            let task = reveal.run(&mut surface, row, "héllo", &clock, &cancel);
            tokio::pin!(task);

            // Poll until the third character has been written, then stop polling
            tokio::select! {
                _ = &mut task => panic!("reveal should still be running"),
                _ = tokio::time::sleep(Duration::from_millis(25)) => {}
            }
        }

        assert_eq!(
            surface.view.get(row).unwrap().bubble,
            Bubble::Text {
                text: "hél".to_string(),
                timestamp: None,
                cursor: true
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_writes_full_text() {
        let (mut surface, row) = setup();
        let clock = FixedClock("1:05 PM".into());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = Reveal::default()
            .run(&mut surface, row, "interrupted reply", &clock, &cancel)
            .await;

        assert_eq!(outcome, RevealOutcome::Interrupted);
        assert_eq!(
            surface.view.get(row).unwrap().bubble,
            Bubble::text("interrupted reply", Some("1:05 PM".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_row_detaches() {
        let (mut surface, row) = setup();
        surface.view.clear();

        let outcome = Reveal::default()
            .run(&mut surface, row, "nobody home", &FixedClock("0:00".into()), &CancellationToken::new())
            .await;

        assert_eq!(outcome, RevealOutcome::Detached);
        assert!(surface.view.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_text_completes_immediately() {
        let (mut surface, row) = setup();
        let outcome = Reveal::default()
            .run(&mut surface, row, "", &FixedClock("0:00".into()), &CancellationToken::new())
            .await;
        assert_eq!(outcome, RevealOutcome::Completed);
        assert_eq!(surface.view.get(row).unwrap().bubble, Bubble::text("", Some("0:00".into())));
    }
}
