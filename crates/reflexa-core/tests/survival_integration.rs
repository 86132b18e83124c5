//! Integration tests for the survival session: clock, rate gate and
//! continuation budget working together.

use chrono::{DateTime, Duration, TimeZone, Utc};
use reflexa_core::{
    Color, ContinuationTicket, EndReason, Event, FailureKind, Phase, SessionSettings,
    SurvivalSession, Verdict,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 10, 18, 0, 0).unwrap()
}

fn at(ms: i64) -> DateTime<Utc> {
    t0() + Duration::milliseconds(ms)
}

fn started(max_continuations: u32) -> SurvivalSession {
    let settings = SessionSettings {
        max_continuations,
        seed: Some(2026),
        ..SessionSettings::default()
    };
    let mut session = SurvivalSession::new(settings, t0());
    session.begin(t0());
    session
}

fn right(s: &SurvivalSession) -> Color {
    s.current_challenge().unwrap().ink
}

fn wrong(s: &SurvivalSession) -> Color {
    s.current_challenge().unwrap().word
}

fn offered(events: &[Event]) -> Option<(ContinuationTicket, FailureKind)> {
    events.iter().find_map(|e| match e {
        Event::ContinuationOffered { ticket, failure, .. } => Some((*ticket, *failure)),
        _ => None,
    })
}

/// Answer correctly every 1.5 s and tick every second over `[from, to)`.
fn play_steadily(s: &mut SurvivalSession, from: i64, to: i64, log: &mut Vec<Event>) {
    let mut ms = from;
    while ms < to {
        if ms % 1_500 == 0 {
            log.extend(s.submit(right(s), at(ms)));
        }
        if ms % 1_000 == 0 {
            log.extend(s.tick(at(ms)));
        }
        ms += 500;
    }
}

#[test]
fn test_grant_after_four_minutes_excludes_ad_and_wait() {
    let mut s = started(2);
    let mut log = Vec::new();
    play_steadily(&mut s, 0, 240_000, &mut log);

    let audits: Vec<_> = log
        .iter()
        .filter_map(|e| match e {
            Event::RateAudited { audit, .. } => Some(*audit),
            _ => None,
        })
        .collect();
    assert_eq!(audits.len(), 3);
    assert!(audits.iter().all(|a| a.passed() && a.actual == 40));
    assert_eq!(
        audits.iter().map(|a| a.required).collect::<Vec<_>>(),
        vec![30, 31, 32]
    );

    let failure = s.submit(wrong(&s), at(240_000));
    let (ticket, kind) = offered(&failure).expect("prompt after wrong answer");
    assert_eq!(kind, FailureKind::WrongAnswer);
    assert_eq!(s.last_checked_minute(), 4);

    // Ad watched for 30 s, then the player waits 10 s before tapping.
    s.resolve_continuation(ticket, Verdict::Granted, at(270_000));
    assert_eq!(s.continuations_used(), 1);
    s.submit(right(&s), at(280_000));

    assert_eq!(s.active_time(at(280_000)), Duration::minutes(4));
    assert_eq!(s.phase(), Phase::Active);
}

#[test]
fn test_third_failure_ends_without_prompt() {
    let mut s = started(2);

    let (t1, _) = offered(&s.submit(wrong(&s), at(1_000))).unwrap();
    s.resolve_continuation(t1, Verdict::Granted, at(2_000));
    s.submit(right(&s), at(3_000));

    // Only two inputs in minute 0; the audit at active 60 s falls short.
    let shortfall = s.tick(at(62_000));
    assert!(shortfall
        .iter()
        .any(|e| matches!(e, Event::RateShortfall { minute: 0, required: 30, actual: 2, .. })));
    let (t2, kind) = offered(&shortfall).unwrap();
    assert_eq!(kind, FailureKind::RateShortfall);
    s.resolve_continuation(t2, Verdict::Granted, at(70_000));
    s.submit(right(&s), at(71_000));
    assert_eq!(s.continuations_used(), 2);

    let last = s.submit(wrong(&s), at(72_000));
    assert!(offered(&last).is_none());
    assert_eq!(s.phase(), Phase::GameOver);
    let summary = s.summary().unwrap();
    assert_eq!(summary.end_reason, EndReason::WrongAnswer);
    assert_eq!(summary.continuations_used, 2);
}

#[test]
fn test_rate_shortfall_with_budget_spent_ends_session() {
    let mut s = started(0);
    s.submit(right(&s), at(500));
    let events = s.tick(at(60_000));
    assert!(offered(&events).is_none());
    assert_eq!(s.summary().unwrap().end_reason, EndReason::RateShortfall);
}

#[test]
fn test_ticks_within_one_second_audit_once() {
    let mut s = started(2);
    let mut log = Vec::new();
    play_steadily(&mut s, 0, 60_000, &mut log);

    let mut audits = 0;
    for ms in [60_000, 60_100, 60_250, 60_999, 61_000] {
        audits += s
            .tick(at(ms))
            .iter()
            .filter(|e| matches!(e, Event::RateAudited { .. }))
            .count();
    }
    assert_eq!(audits, 1);
    assert_eq!(s.last_checked_minute(), 1);
}

#[test]
fn test_declining_first_prompt_keeps_budget_untouched() {
    let mut s = started(2);
    let (ticket, _) = offered(&s.submit(wrong(&s), at(4_000))).unwrap();
    s.resolve_continuation(ticket, Verdict::Declined, at(9_000));
    let summary = s.summary().unwrap();
    assert_eq!(summary.continuations_used, 0);
    assert_eq!(summary.end_reason, EndReason::ContinuationDeclined);
    assert_eq!(summary.active_play_time_ms, 4_000);
}

#[test]
fn test_score_never_decreases() {
    let mut s = started(2);
    let mut log = Vec::new();
    play_steadily(&mut s, 0, 30_000, &mut log);
    let (ticket, _) = offered(&s.submit(wrong(&s), at(30_200))).unwrap();
    s.resolve_continuation(ticket, Verdict::Granted, at(31_000));
    play_steadily(&mut s, 31_500, 60_000, &mut log);
    log.extend(s.quit(at(60_000)));

    let mut previous = 0;
    for event in &log {
        if let Event::AnswerScored { total_score, .. } = event {
            assert!(*total_score >= previous);
            previous = *total_score;
        }
    }
    let summary = s.summary().unwrap();
    assert_eq!(summary.final_score, previous);
    assert_eq!(summary.derived_xp, previous / 10);
}

#[test]
fn test_late_resolution_after_quit_is_noop() {
    let mut s = started(2);
    let (ticket, _) = offered(&s.submit(wrong(&s), at(1_000))).unwrap();
    s.quit(at(2_000));
    assert!(s
        .resolve_continuation(ticket, Verdict::Granted, at(90_000))
        .is_empty());
    assert_eq!(s.phase(), Phase::GameOver);
    assert_eq!(s.continuations_used(), 0);
}
