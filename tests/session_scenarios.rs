mod common;

use common::{FakeOutput, FakeRenderer};
use volumes::automation::AutomationState;
use volumes::notes::{C_MAJOR_TWO_OCTAVES, TREBLE_RATIO};
use volumes::palette::TINTS;
use volumes::{
    AutomationKind, EntityId, GestureSink, Param, SessionConfig, Session, Slot, Target, VoiceId,
};

type TestSession = Session<FakeRenderer, FakeOutput>;

fn session() -> TestSession {
    session_with(FakeOutput::new(48_000.0))
}

fn session_with(output: FakeOutput) -> TestSession {
    let config = SessionConfig {
        seed: Some(7),
        ..SessionConfig::default()
    };
    Session::new(FakeRenderer::default(), output, config)
}

fn run(session: &mut TestSession, ticks: usize) {
    for _ in 0..ticks {
        session.tick();
    }
}

fn emissive(id: EntityId) -> Slot {
    Slot::new(Target::Entity(id), Param::Emissive)
}

fn elevation(id: EntityId) -> Slot {
    Slot::new(Target::Entity(id), Param::Elevation)
}

fn volume(voice: VoiceId) -> Slot {
    Slot::new(Target::Voice(voice), Param::Volume)
}

#[test]
fn placement_starts_glow_and_bob() {
    let mut session = session();
    let id = session.placement_requested([0.5, 0.0, -1.0]);

    let record = session.registry().lookup(id).expect("registered");
    let visual = session.renderer().visual_for(id).expect("visual created");
    assert_eq!(record.emissive, 1.0);
    assert!(!record.selected);
    assert_eq!(visual.location, [0.5, 0.0, -1.0]);
    assert!(TINTS.contains(&visual.tint));
    assert_eq!(visual.emissive, 1.0);
    assert_eq!(session.scheduler().kind_at(emissive(id)), Some(AutomationKind::Glow));
    assert_eq!(session.scheduler().kind_at(elevation(id)), Some(AutomationKind::Bob));

    run(&mut session, 30);
    let visual = session.renderer().visual_for(id).expect("visual created");
    assert!((visual.emissive - 4.0).abs() < 1e-3, "emissive={}", visual.emissive);
    assert!((visual.offset - 0.03).abs() < 1e-4, "offset={}", visual.offset);
}

#[test]
fn select_and_release_end_to_end() {
    let mut session = session();
    let id = session.placement_requested([0.0, 0.0, 0.0]);
    let glow = session
        .registry()
        .lookup(id)
        .and_then(|record| record.automation(Param::Emissive))
        .expect("glow tracked");

    session.on_select_begin(id);
    assert_eq!(session.scheduler().state(glow), Some(AutomationState::Superseded));
    assert_eq!(
        session.scheduler().kind_at(emissive(id)),
        Some(AutomationKind::HighlightAssert)
    );
    for voice in VoiceId::ALL {
        assert_eq!(session.scheduler().kind_at(volume(voice)), Some(AutomationKind::FadeIn));
        assert_eq!(session.voice(voice).target_level(), 1.0);
    }

    let pitch = session.pitch();
    assert!(C_MAJOR_TWO_OCTAVES.contains(&pitch.bass));
    assert_eq!(pitch.treble, pitch.bass * TREBLE_RATIO);
    assert_eq!(session.voice(VoiceId::Bass).oscillator().frequency(), pitch.bass);
    assert_eq!(session.voice(VoiceId::Treble).oscillator().frequency(), pitch.treble);

    run(&mut session, 100);
    for voice in VoiceId::ALL {
        assert_eq!(session.voice(voice).volume(), 1.0);
    }
    let record = session.registry().lookup(id).expect("registered");
    assert!(record.selected);
    assert_eq!(record.emissive, 10.0);
    assert_eq!(session.renderer().visual_for(id).unwrap().emissive, 10.0);

    session.on_select_end(id);
    assert_eq!(
        session.scheduler().kind_at(emissive(id)),
        Some(AutomationKind::HighlightRelease)
    );
    for voice in VoiceId::ALL {
        assert_eq!(session.scheduler().kind_at(volume(voice)), Some(AutomationKind::FadeOut));
    }

    run(&mut session, 100);
    for voice in VoiceId::ALL {
        assert_eq!(session.voice(voice).volume(), 0.0);
        assert!(!session.scheduler().is_active(volume(voice)));
    }
    let record = session.registry().lookup(id).expect("registered");
    assert!(!record.selected);
    assert_eq!(record.emissive, 1.0);
}

#[test]
fn fade_in_during_fade_out_supersedes_it() {
    let mut session = session();
    let id = session.placement_requested([0.0, 0.0, 0.0]);
    session.on_select_begin(id);
    run(&mut session, 60);
    session.on_select_end(id);
    run(&mut session, 20);
    let fade_out = session.voice(VoiceId::Treble).volume();
    assert!((fade_out - 0.4).abs() < 1e-3, "volume={fade_out}");

    session.on_select_begin(id);
    assert_eq!(session.scheduler().len(), 4);
    assert_eq!(
        session.scheduler().kind_at(volume(VoiceId::Treble)),
        Some(AutomationKind::FadeIn)
    );
    run(&mut session, 100);
    for voice in VoiceId::ALL {
        assert_eq!(session.voice(voice).volume(), 1.0);
    }
}

#[test]
fn bob_holds_while_selected_and_resumes() {
    let mut session = session();
    let id = session.placement_requested([0.0, 0.0, 0.0]);
    run(&mut session, 25);
    let paused = session.registry().lookup(id).unwrap().elevation;

    session.on_select_begin(id);
    run(&mut session, 80);
    assert_eq!(session.registry().lookup(id).unwrap().elevation, paused);
    let bob = session
        .registry()
        .lookup(id)
        .and_then(|record| record.automation(Param::Elevation))
        .expect("bob tracked");
    assert_eq!(session.scheduler().state(bob), Some(AutomationState::Held));

    session.on_select_end(id);
    session.tick();
    let resumed = session.registry().lookup(id).unwrap().elevation;
    assert!((resumed - (paused + 0.001)).abs() < 1e-5, "resumed={resumed}");
}

#[test]
fn oscillating_parameters_stay_in_bounds() {
    let mut session = session();
    let id = session.placement_requested([0.0, 0.0, 0.0]);
    for _ in 0..2_000 {
        session.tick();
        let record = session.registry().lookup(id).unwrap();
        assert!((1.0..=10.0).contains(&record.emissive));
        assert!((0.0..=0.1).contains(&record.elevation));
    }
}

#[test]
fn bob_travels_between_placement_height_and_its_peak() {
    let mut session = session();
    let id = session.placement_requested([0.0, 0.0, 0.0]);
    let mut lowest = f32::MAX;
    let mut highest = f32::MIN;
    for _ in 0..600 {
        session.tick();
        let offset = session.renderer().visual_for(id).unwrap().offset;
        lowest = lowest.min(offset);
        highest = highest.max(offset);
    }
    assert_eq!(lowest, 0.0);
    assert_eq!(highest, 0.1);
}

#[test]
fn release_without_selection_keeps_the_glow() {
    let mut session = session();
    let id = session.placement_requested([0.0, 0.0, 0.0]);
    run(&mut session, 30);
    let glow = session
        .registry()
        .lookup(id)
        .and_then(|record| record.automation(Param::Emissive))
        .expect("glow tracked");

    session.on_select_end(id);
    assert_eq!(session.scheduler().state(glow), Some(AutomationState::Running));
    assert_eq!(session.scheduler().kind_at(emissive(id)), Some(AutomationKind::Glow));
    for voice in VoiceId::ALL {
        assert!(!session.scheduler().is_active(volume(voice)));
    }

    run(&mut session, 500);
    assert_eq!(session.scheduler().kind_at(emissive(id)), Some(AutomationKind::Glow));
    assert!(session.registry().lookup(id).unwrap().emissive > 1.0);
}

#[test]
fn unknown_identifiers_are_ignored() {
    let mut session = session();
    let known = session.placement_requested([0.0, 0.0, 0.0]);
    let stranger = EntityId::new(999);

    session.on_select_begin(stranger);
    session.on_select_change(stranger);
    session.on_select_end(stranger);
    run(&mut session, 10);

    assert_eq!(session.scheduler().len(), 2);
    assert_eq!(session.voice(VoiceId::Treble).volume(), 0.0);
    assert!(session.registry().lookup(known).is_some());
    assert!(session.registry().lookup(stranger).is_none());
}

#[test]
fn select_change_has_no_effect() {
    let mut session = session();
    let id = session.placement_requested([0.0, 0.0, 0.0]);
    session.on_select_begin(id);
    let pitch = session.pitch();
    session.on_select_change(id);
    assert_eq!(session.pitch(), pitch);
    assert_eq!(session.scheduler().len(), 4);
}

#[test]
fn device_failure_leaves_session_usable_and_retry_succeeds() {
    let mut session = session_with(FakeOutput::unavailable(44_100.0));
    let frequency = session.voice(VoiceId::Bass).oscillator().frequency();

    assert!(session.start_audio().is_err());
    assert!(!session.is_audio_running());
    assert_eq!(session.voice(VoiceId::Bass).oscillator().frequency(), frequency);

    let id = session.placement_requested([0.0, 0.0, 0.0]);
    session.on_select_begin(id);
    run(&mut session, 100);
    assert_eq!(session.voice(VoiceId::Treble).volume(), 1.0);

    session.output_mut().device_available = true;
    session.start_audio().expect("device available now");
    assert!(session.is_audio_running());
    assert_eq!(session.voice(VoiceId::Treble).oscillator().sample_rate(), 44_100.0);
    assert!(session.output_mut().pull(4_096).iter().any(|s| *s != 0.0));
}

#[test]
fn failed_start_does_not_reach_the_device() {
    let mut session = session();
    session.output_mut().device_available = false;
    assert!(session.start_audio().is_err());
    session.output_mut().device_available = true;
    assert!(session.start_audio().is_ok());
    assert_eq!(session.output().start_attempts, 1);
}

#[test]
fn silent_until_selected() {
    let mut session = session();
    session.start_audio().expect("fake device starts");
    session.placement_requested([0.0, 0.0, 0.0]);
    run(&mut session, 10);
    assert!(session.output_mut().pull(2_048).iter().all(|s| s.abs() < 1e-6));
}

#[test]
fn sample_rate_changes_reach_oscillators_on_next_tick() {
    let mut session = session();
    session.start_audio().expect("fake device starts");
    assert_eq!(session.voice(VoiceId::Treble).oscillator().sample_rate(), 48_000.0);

    session.output_mut().change_sample_rate(96_000.0);
    session.tick();
    for voice in VoiceId::ALL {
        assert_eq!(session.voice(voice).oscillator().sample_rate(), 96_000.0);
    }
}

#[test]
fn teardown_freezes_everything() {
    let mut session = session();
    session.start_audio().expect("fake device starts");
    let id = session.placement_requested([0.0, 0.0, 0.0]);
    session.on_select_begin(id);
    run(&mut session, 40);
    let level = session.voice(VoiceId::Bass).volume();
    let glow = session.registry().lookup(id).unwrap().emissive;

    session.teardown();
    run(&mut session, 40);
    assert!(session.scheduler().is_empty());
    assert!(!session.is_audio_running());
    assert_eq!(session.voice(VoiceId::Bass).volume(), level);
    assert_eq!(session.registry().lookup(id).unwrap().emissive, glow);
}

#[test]
fn pitch_picks_stay_on_the_scale() {
    let mut session = session();
    let id = session.placement_requested([0.0, 0.0, 0.0]);
    for _ in 0..200 {
        session.on_select_begin(id);
        let pitch = session.pitch();
        assert!(C_MAJOR_TWO_OCTAVES.contains(&pitch.bass));
        assert_eq!(pitch.treble, pitch.bass * TREBLE_RATIO);
        session.on_select_end(id);
    }
}
