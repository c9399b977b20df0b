//! Timer controller against a live session

mod common;

use common::{story, Harness};
use dreams_playback::{ExpiryAction, TimerController, TimerPreset};

#[test]
fn default_selection_follows_preference() {
    let h = Harness::new();
    assert_eq!(
        TimerController::new(h.preferences.clone()).selected(),
        TimerPreset::ThirtyMinutes
    );

    h.preferences.set_default_sleep_timer(50).unwrap();
    assert_eq!(
        TimerController::new(h.preferences.clone()).selected(),
        TimerPreset::FortyFiveMinutes
    );
}

#[test]
fn start_counts_down_in_whole_seconds() {
    let h = Harness::new();
    let mut session = h.controller();
    let timers = TimerController::new(h.preferences.clone());

    timers.start(&mut session).unwrap();
    assert!(timers.is_active(&session));
    assert_eq!(timers.remaining(&session), 1800);

    h.advance_secs(1);
    assert_eq!(timers.remaining(&session), 1799);

    h.advance_ms(500);
    assert_eq!(timers.remaining(&session), 1798);
}

#[test]
fn selecting_restarts_a_running_timer() {
    let h = Harness::new();
    let mut session = h.controller();
    let mut timers = TimerController::new(h.preferences.clone());

    timers.start(&mut session).unwrap();
    h.advance_secs(60);
    timers
        .select(TimerPreset::FiveMinutes, &mut session)
        .unwrap();

    assert_eq!(timers.selected(), TimerPreset::FiveMinutes);
    assert_eq!(timers.remaining(&session), 300);
}

#[test]
fn selecting_while_idle_does_not_start() {
    let h = Harness::new();
    let mut session = h.controller();
    let mut timers = TimerController::new(h.preferences.clone());

    timers.select(TimerPreset::NinetyMinutes, &mut session).unwrap();

    assert!(!timers.is_active(&session));
    assert_eq!(timers.remaining(&session), 0);
}

#[test]
fn stop_clears_the_timer() {
    let h = Harness::new();
    let mut session = h.controller();
    let timers = TimerController::new(h.preferences.clone());

    timers.start(&mut session).unwrap();
    timers.stop(&mut session).unwrap();

    assert!(!timers.is_active(&session));
    assert_eq!(timers.remaining(&session), 0);
}

#[test]
fn fade_flag_picks_expiry_action() {
    let h = Harness::new();
    let mut session = h.controller();
    let timers = TimerController::new(h.preferences.clone());

    timers.set_fade_out(false).unwrap();
    assert!(!h.preferences.get().fade_out_enabled);
    timers.start(&mut session).unwrap();
    assert_eq!(session.sleep_timer_action(), Some(ExpiryAction::Pause));

    timers.set_fade_out(true).unwrap();
    timers.start(&mut session).unwrap();
    assert_eq!(session.sleep_timer_action(), Some(ExpiryAction::FadeOut));
}

#[test]
fn expiry_through_the_facade_pauses() {
    let h = Harness::new();
    let mut session = h.controller();
    h.load_ready(&mut session, story("Short Nap"), 7200.0);
    session.play();
    let mut timers = TimerController::new(h.preferences.clone());
    timers.set_fade_out(false).unwrap();
    timers.select(TimerPreset::FiveMinutes, &mut session).unwrap();
    timers.start(&mut session).unwrap();

    h.advance_secs(300);
    session.on_timer_tick();

    assert!(!session.state().is_playing);
    assert!(!timers.is_active(&session));
}
