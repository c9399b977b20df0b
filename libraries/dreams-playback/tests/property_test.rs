//! Property-based tests for the session controller
//!
//! Uses proptest to check transport invariants across random inputs.

mod common;

use common::{story, Harness};
use proptest::prelude::*;
use std::time::Duration;

proptest! {
    /// Property: seek(p) lands on p * duration for every p in [0, 1]
    #[test]
    fn seek_lands_on_fraction_of_duration(
        duration in 1.0f64..20_000.0,
        progress in 0.0f64..=1.0,
    ) {
        let h = Harness::new();
        let mut session = h.controller();
        h.load_ready(&mut session, story("Property"), duration);

        session.seek(progress);

        prop_assert!((session.state().current_time - progress * duration).abs() < 1e-9);
    }

    /// Property: seek never leaves [0, duration], whatever the input
    #[test]
    fn seek_stays_within_story(
        duration in 1.0f64..20_000.0,
        progress in -10.0f64..10.0,
    ) {
        let h = Harness::new();
        let mut session = h.controller();
        h.load_ready(&mut session, story("Bounds"), duration);

        session.seek(progress);

        let time = session.state().current_time;
        prop_assert!((0.0..=duration).contains(&time));
    }

    /// Property: toggling twice restores is_playing
    #[test]
    fn toggle_is_an_involution(start_playing in any::<bool>(), toggles in 1usize..20) {
        let h = Harness::new();
        let mut session = h.controller();
        h.load_ready(&mut session, story("Toggle"), 600.0);
        if start_playing {
            session.play();
        }

        for _ in 0..toggles {
            let before = session.state().is_playing;
            session.toggle_playback();
            session.toggle_playback();
            prop_assert_eq!(session.state().is_playing, before);
        }
    }

    /// Property: any fade ends paused at the original volume after exactly
    /// `steps` volume changes plus the restore
    #[test]
    fn fade_always_ends_restored(
        volume in 0.05f32..=1.0,
        steps in 1u32..100,
        seconds in 1u64..60,
    ) {
        let h = Harness::new();
        h.preferences.set_volume(volume).unwrap();
        let mut session = h.controller();
        h.load_ready(&mut session, story("Fade"), 3600.0);
        session.play();
        h.backend.log().volume_history.clear();

        session.fade_out_and_stop_with_steps(Duration::from_secs(seconds), steps).unwrap();
        h.advance_secs(i64::try_from(seconds).unwrap());
        session.on_fade_tick();

        let history = h.backend.log().volume_history.clone();
        prop_assert_eq!(history.len(), steps as usize + 1);
        prop_assert!(history[..steps as usize].windows(2).all(|w| w[1] <= w[0]));
        prop_assert_eq!(history[steps as usize - 1], 0.0);
        prop_assert_eq!(session.volume(), volume);
        prop_assert!(!session.state().is_playing);
    }
}
