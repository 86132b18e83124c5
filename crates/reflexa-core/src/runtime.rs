//! Single-consumer driver for a survival session.
//!
//! Ticks, player commands and oracle resolutions are all funnelled into one
//! `tokio::select!` loop that owns the [`SurvivalSession`], so no two state
//! changes ever interleave. The oracle call is the only spawned task; its
//! result comes back as a message tagged with the ticket it answers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::challenge::Color;
use crate::events::Event;
use crate::oracle::RewardOracle;
use crate::session::{ContinuationTicket, SessionSink, SessionSummary, SurvivalSession, Verdict};

/// Wall-clock source for the runtime.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Player commands accepted by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Answer(Color),
    Pause,
    Resume,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub tick_interval: Duration,
    /// Oracle calls slower than this resolve as declined.
    pub oracle_timeout: Duration,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            oracle_timeout: Duration::from_secs(120),
        }
    }
}

pub struct SessionRuntime {
    session: SurvivalSession,
    oracle: Arc<dyn RewardOracle>,
    time: Arc<dyn TimeSource>,
    settings: RuntimeSettings,
}

impl SessionRuntime {
    pub fn new(
        session: SurvivalSession,
        oracle: Arc<dyn RewardOracle>,
        time: Arc<dyn TimeSource>,
        settings: RuntimeSettings,
    ) -> Self {
        Self {
            session,
            oracle,
            time,
            settings,
        }
    }

    /// Play the session to completion.
    ///
    /// Every produced event is forwarded to `events` (send failures are
    /// ignored; the session keeps running headless). Closing `commands`
    /// counts as quitting. The sink is notified exactly once, right before
    /// the summary is returned.
    pub async fn run<S>(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        events: mpsc::UnboundedSender<Event>,
        sink: &mut S,
    ) -> SessionSummary
    where
        S: SessionSink + ?Sized,
    {
        let (resolved_tx, mut resolved_rx) =
            mpsc::unbounded_channel::<(ContinuationTicket, Verdict)>();
        let mut pending_oracle: Option<JoinHandle<()>> = None;

        let mut ticker = tokio::time::interval(self.settings.tick_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut produced = self.session.begin(self.time.now());

        let summary = loop {
            let mut ended = None;
            for event in produced.drain(..) {
                match &event {
                    Event::ContinuationOffered { ticket, .. } => {
                        if let Some(stale) = pending_oracle.take() {
                            stale.abort();
                        }
                        pending_oracle = Some(self.spawn_oracle(*ticket, resolved_tx.clone()));
                    }
                    Event::SessionEnded { summary, .. } => ended = Some(summary.clone()),
                    _ => {}
                }
                let _ = events.send(event);
            }
            if let Some(summary) = ended {
                break summary;
            }

            produced = tokio::select! {
                _ = ticker.tick() => self.session.tick(self.time.now()),
                command = commands.recv() => {
                    let now = self.time.now();
                    match command {
                        Some(Command::Answer(color)) => self.session.submit(color, now),
                        Some(Command::Pause) => self.session.pause(now),
                        Some(Command::Resume) => self.session.resume(now),
                        Some(Command::Quit) => self.session.quit(now),
                        None => {
                            debug!("command channel closed; quitting session");
                            self.session.quit(now)
                        }
                    }
                }
                Some((ticket, verdict)) = resolved_rx.recv() => {
                    pending_oracle = None;
                    self.session.resolve_continuation(ticket, verdict, self.time.now())
                }
            };
        };

        if let Some(handle) = pending_oracle.take() {
            handle.abort();
        }
        sink.on_session_end(&summary);
        summary
    }

    fn spawn_oracle(
        &self,
        ticket: ContinuationTicket,
        resolved: mpsc::UnboundedSender<(ContinuationTicket, Verdict)>,
    ) -> JoinHandle<()> {
        let oracle = Arc::clone(&self.oracle);
        let timeout = self.settings.oracle_timeout;
        tokio::spawn(async move {
            let verdict = match tokio::time::timeout(timeout, oracle.request_continuation()).await
            {
                Ok(Ok(verdict)) => verdict,
                Ok(Err(err)) => {
                    warn!(ticket = ticket.0, %err, "reward oracle failed; treating as declined");
                    Verdict::Declined
                }
                Err(_) => {
                    warn!(ticket = ticket.0, ?timeout, "reward oracle timed out; treating as declined");
                    Verdict::Declined
                }
            };
            let _ = resolved.send((ticket, verdict));
        })
    }
}
