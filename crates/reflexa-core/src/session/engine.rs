//! Survival session aggregator.
//!
//! The session is the single owner of every piece of mutable state: phase,
//! score, play clock, input ledger, rate gate and continuation controller.
//! It does not use internal threads or read the system clock; each command
//! takes the caller's `now` and returns the events it produced.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = SurvivalSession::new(SessionSettings::default(), now);
//! session.begin(now);
//! // On every player input:
//! session.submit(answer, now);
//! // Once a second:
//! session.tick(now);
//! // When the oracle answers a ContinuationOffered event:
//! session.resolve_continuation(ticket, verdict, now);
//! ```

use chrono::{DateTime, Duration, Utc};
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::continuation::{
    ContinuationController, ContinuationTicket, FailureDecision, FailureKind, Resolution, Verdict,
};
use super::phase::{Phase, Transition};
use super::summary::{derive_xp, EndReason, SessionSummary};
use crate::challenge::{Challenge, ChallengeGenerator, Color};
use crate::clock::{InputLedger, PlayClock, QuotaPolicy, RateGate};
use crate::events::Event;
use crate::scoring::ScoringTable;

/// Tunables for one survival session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub quota: QuotaPolicy,
    pub max_continuations: u32,
    pub ledger_retention: Duration,
    pub scoring: ScoringTable,
    pub generator: ChallengeGenerator,
    /// Random seed for reproducible challenge sequences (None = random).
    pub seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            quota: QuotaPolicy::default(),
            max_continuations: 2,
            ledger_retention: Duration::minutes(5),
            scoring: ScoringTable::default(),
            generator: ChallengeGenerator::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SurvivalSession {
    id: Uuid,
    phase: Phase,
    score: u64,
    challenges_answered: u32,
    clock: PlayClock,
    ledger: InputLedger,
    rate_gate: RateGate,
    continuation: ContinuationController,
    generator: ChallengeGenerator,
    scoring: ScoringTable,
    rng: Mcg128Xsl64,
    current_challenge: Option<Challenge>,
    challenge_shown_at: Option<DateTime<Utc>>,
    /// Between a granted continuation and the next input. The clock stays
    /// paused while this is set even though the phase is `Active`.
    awaiting_first_input_after_resume: bool,
    summary: Option<SessionSummary>,
}

impl SurvivalSession {
    /// Create a session in `Idle`.
    pub fn new(settings: SessionSettings, now: DateTime<Utc>) -> Self {
        let rng = match settings.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Idle,
            score: 0,
            challenges_answered: 0,
            clock: PlayClock::start(now),
            ledger: InputLedger::new(settings.ledger_retention),
            rate_gate: RateGate::new(settings.quota),
            continuation: ContinuationController::new(settings.max_continuations),
            generator: settings.generator,
            scoring: settings.scoring,
            rng,
            current_challenge: None,
            challenge_shown_at: None,
            awaiting_first_input_after_resume: false,
            summary: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn challenges_answered(&self) -> u32 {
        self.challenges_answered
    }

    pub fn continuations_used(&self) -> u32 {
        self.continuation.used()
    }

    pub fn max_continuations(&self) -> u32 {
        self.continuation.max()
    }

    pub fn continuation(&self) -> &ContinuationController {
        &self.continuation
    }

    pub fn clock(&self) -> &PlayClock {
        &self.clock
    }

    pub fn active_time(&self, now: DateTime<Utc>) -> Duration {
        self.clock.active_time(now)
    }

    pub fn last_checked_minute(&self) -> u64 {
        self.rate_gate.last_checked_minute()
    }

    pub fn current_challenge(&self) -> Option<&Challenge> {
        self.current_challenge.as_ref()
    }

    pub fn challenge_shown_at(&self) -> Option<DateTime<Utc>> {
        self.challenge_shown_at
    }

    /// True between a granted continuation and the player's next input.
    pub fn is_gated(&self) -> bool {
        self.awaiting_first_input_after_resume
    }

    /// Inputs are accepted only while `Active`; gated inputs lift the gate.
    pub fn accepts_input(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the clock and show the first challenge.
    pub fn begin(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if !self.transition(Transition::ShowFirstChallenge) {
            return Vec::new();
        }
        self.clock.restart(now);
        info!(session_id = %self.id, "survival session started");
        let mut events = vec![Event::SessionStarted {
            session_id: self.id,
            at: now,
        }];
        events.push(self.show_next_challenge(now));
        events
    }

    /// Handle one player answer.
    pub fn submit(&mut self, answer: Color, now: DateTime<Utc>) -> Vec<Event> {
        if self.phase != Phase::Active {
            warn!(phase = ?self.phase, %answer, "input outside active play; discarding");
            return vec![Event::InputDiscarded {
                phase: self.phase,
                at: now,
            }];
        }

        let mut events = Vec::new();
        // Gated wait before this input; it is not reaction time.
        let mut gated = Duration::zero();
        if self.awaiting_first_input_after_resume {
            gated = self.clock.leave_pause(now).unwrap_or_else(Duration::zero);
            self.awaiting_first_input_after_resume = false;
            self.continuation.first_input();
            events.push(Event::ResumeGateCleared {
                gated_ms: gated.num_milliseconds(),
                active_ms: self.clock.active_time(now).num_milliseconds(),
                at: now,
            });
        }

        let Some(challenge) = self.current_challenge.clone() else {
            warn!("active session without a challenge; discarding input");
            events.push(Event::InputDiscarded {
                phase: self.phase,
                at: now,
            });
            return events;
        };

        let active = self.clock.active_time(now);
        self.ledger.record(active);

        if challenge.is_correct(answer) {
            let shown_at = self.challenge_shown_at.unwrap_or(now);
            let latency = (now - shown_at - gated).max(Duration::zero());
            let award = self.scoring.score(latency);
            self.score += u64::from(award.points);
            self.challenges_answered += 1;
            debug!(%answer, latency_ms = latency.num_milliseconds(), points = award.points, "answer scored");
            events.push(Event::AnswerScored {
                answer,
                latency_ms: latency.num_milliseconds(),
                points: award.points,
                label: award.label,
                total_score: self.score,
                at: now,
            });
            events.push(self.show_next_challenge(now));
            return events;
        }

        events.push(Event::AnswerRejected {
            answer,
            expected: challenge.correct_answers.clone(),
            at: now,
        });

        // A minute boundary crossed in the same instant is marked checked
        // here; the wrong answer is the failure the player sees.
        if let Some(audit) = self.rate_gate.poll(active, &self.ledger) {
            if !audit.passed() {
                debug!(minute = audit.minute, "rate shortfall superseded by wrong answer");
            }
            events.push(Event::RateAudited { audit, at: now });
        }

        events.extend(self.fail(FailureKind::WrongAnswer, now));
        events
    }

    /// Periodic tick driving the rate gate. Suppressed unless the session is
    /// `Active` and not gated.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.phase != Phase::Active || self.awaiting_first_input_after_resume {
            return Vec::new();
        }
        let active = self.clock.active_time(now);
        let Some(audit) = self.rate_gate.poll(active, &self.ledger) else {
            return Vec::new();
        };

        let mut events = vec![Event::RateAudited { audit, at: now }];
        if !audit.passed() {
            info!(
                minute = audit.minute,
                required = audit.required,
                actual = audit.actual,
                "input rate below quota"
            );
            events.push(Event::RateShortfall {
                minute: audit.minute,
                required: audit.required,
                actual: audit.actual,
                at: now,
            });
            events.extend(self.fail(FailureKind::RateShortfall, now));
        }
        events
    }

    /// Apply the oracle's verdict for `ticket`. Late or unknown tickets are
    /// no-ops.
    pub fn resolve_continuation(
        &mut self,
        ticket: ContinuationTicket,
        verdict: Verdict,
        now: DateTime<Utc>,
    ) -> Vec<Event> {
        if self.phase != Phase::AwaitingContinuation {
            warn!(ticket = ticket.0, phase = ?self.phase, "continuation resolved outside prompt; ignoring");
            return Vec::new();
        }

        match self.continuation.resolve(ticket, verdict) {
            Resolution::Stale => Vec::new(),
            Resolution::Declined => {
                let mut events = vec![Event::ContinuationDeclined { ticket, at: now }];
                events.extend(self.end(EndReason::ContinuationDeclined, now));
                events
            }
            Resolution::Granted { used } => {
                if !self.transition(Transition::Grant) {
                    return Vec::new();
                }
                // Close the failure pause, then open the wait for the first
                // input as a separate episode.
                self.clock.leave_pause(now);
                self.clock.enter_pause(now);
                self.awaiting_first_input_after_resume = true;

                let mut events = vec![Event::ContinuationGranted {
                    ticket,
                    used,
                    max: self.continuation.max(),
                    at: now,
                }];
                events.push(self.show_next_challenge(now));
                events
            }
        }
    }

    /// Manual pause from ungated active play.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.phase != Phase::Active || self.awaiting_first_input_after_resume {
            warn!(phase = ?self.phase, gated = self.awaiting_first_input_after_resume, "pause ignored");
            return Vec::new();
        }
        if !self.transition(Transition::Pause) {
            return Vec::new();
        }
        self.clock.enter_pause(now);
        vec![Event::SessionPaused {
            active_ms: self.clock.active_time(now).num_milliseconds(),
            at: now,
        }]
    }

    /// Leave a manual pause. The current challenge is shown again so its
    /// latency does not include the pause.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if !self.transition(Transition::Resume) {
            return Vec::new();
        }
        let paused = self.clock.leave_pause(now).unwrap_or_else(Duration::zero);
        self.challenge_shown_at = Some(now);
        let mut events = vec![Event::SessionResumed {
            paused_ms: paused.num_milliseconds(),
            at: now,
        }];
        if let Some(challenge) = self.current_challenge.clone() {
            events.push(Event::ChallengeShown { challenge, at: now });
        }
        events
    }

    /// End the session from any phase. Pending oracle resolutions become
    /// no-ops.
    pub fn quit(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.phase.is_over() {
            return Vec::new();
        }
        self.end(EndReason::Quit, now)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn transition(&mut self, transition: Transition) -> bool {
        match self.phase.apply(transition) {
            Ok(next) => {
                debug!(from = ?self.phase, to = ?next, ?transition, "phase transition");
                self.phase = next;
                true
            }
            Err(err) => {
                warn!(%err, "rejected phase transition");
                false
            }
        }
    }

    fn show_next_challenge(&mut self, now: DateTime<Utc>) -> Event {
        let challenge = self.generator.generate(&mut self.rng);
        self.current_challenge = Some(challenge.clone());
        self.challenge_shown_at = Some(now);
        Event::ChallengeShown { challenge, at: now }
    }

    fn fail(&mut self, kind: FailureKind, now: DateTime<Utc>) -> Vec<Event> {
        match self.continuation.on_failure(kind) {
            FailureDecision::Offer(ticket) => {
                if !self.transition(Transition::Fail) {
                    return Vec::new();
                }
                self.clock.enter_pause(now);
                vec![Event::ContinuationOffered {
                    ticket,
                    failure: kind,
                    used: self.continuation.used(),
                    max: self.continuation.max(),
                    at: now,
                }]
            }
            FailureDecision::GameOver => self.end(kind.into(), now),
            FailureDecision::AlreadyPrompting => Vec::new(),
        }
    }

    fn end(&mut self, reason: EndReason, now: DateTime<Utc>) -> Vec<Event> {
        let transition = match reason {
            EndReason::Quit => Transition::Quit,
            _ => Transition::EndGame,
        };
        if !self.transition(transition) {
            return Vec::new();
        }
        if self.clock.is_paused() {
            self.clock.leave_pause(now);
        }
        self.continuation.cancel();
        self.awaiting_first_input_after_resume = false;
        self.current_challenge = None;
        self.challenge_shown_at = None;

        let summary = SessionSummary {
            session_id: self.id,
            final_score: self.score,
            derived_xp: derive_xp(self.score),
            challenges_answered: self.challenges_answered,
            continuations_used: self.continuation.used(),
            active_play_time_ms: self.clock.active_time(now).num_milliseconds(),
            end_reason: reason,
            started_at: self.clock.started_at(),
            ended_at: now,
        };
        info!(
            session_id = %self.id,
            score = summary.final_score,
            ?reason,
            continuations_used = summary.continuations_used,
            "survival session ended"
        );
        self.summary = Some(summary.clone());
        vec![Event::SessionEnded { summary, at: now }]
    }
}
