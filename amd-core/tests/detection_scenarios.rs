use std::sync::Arc;

use amd_core::config::apply_overrides;
use amd_core::detector::emitter::FixedClock;
use amd_core::detector::{Phase, PhaseStateMachine, WordState};
use amd_core::vad::{FrameClassifier, FrameLabel, MeanAmplitudeClassifier};
use amd_core::{
    AmdParameters, AudioFrame, Cause, Decision, DetectionSession, FrameOutcome, Verdict,
    VerdictReport,
};
use parking_lot::Mutex;

const RATE: u32 = 8000;
const FRAME: usize = 160;

fn silent() -> AudioFrame {
    AudioFrame::new(vec![0; FRAME], RATE)
}

fn voiced() -> AudioFrame {
    let samples = (0..FRAME)
        .map(|i| if i % 2 == 0 { 3000 } else { -3000 })
        .collect();
    AudioFrame::new(samples, RATE)
}

fn new_session(params: AmdParameters) -> (DetectionSession, Arc<Mutex<Vec<VerdictReport>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let session = DetectionSession::new("scenario", params, move |r: &VerdictReport| {
        sink.lock().push(*r)
    })
    .with_clock(FixedClock(0));
    (session, seen)
}

/// Feed frames until a verdict; returns (1-based frame index, verdict).
fn run_until_verdict<I>(session: &mut DetectionSession, frames: I) -> Option<(usize, Verdict)>
where
    I: IntoIterator<Item = AudioFrame>,
{
    for (i, frame) in frames.into_iter().enumerate() {
        if let FrameOutcome::Decided(report) = session.on_frame(&frame) {
            return Some((i + 1, report.verdict()));
        }
    }
    None
}

/// Tiny deterministic generator for pseudo-random frame patterns.
struct Lcg(u64);

impl Lcg {
    fn next_bool(&mut self) -> bool {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % 3 != 0
    }
}

#[test]
fn all_zero_frame_is_silence_at_default_threshold() {
    let classifier = MeanAmplitudeClassifier::new(256);
    assert_eq!(classifier.classify(&silent()), FrameLabel::Silence);
}

#[test]
fn initial_silence_fires_exactly_on_frame_125() {
    let mut params = AmdParameters::default();
    params.initial_silence = 2500;
    let (mut session, seen) = new_session(params);

    let result = run_until_verdict(&mut session, std::iter::repeat_with(silent).take(500));
    assert_eq!(
        result,
        Some((125, Verdict::from_cause(Cause::InitialSilence)))
    );
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn exhausted_budget_is_not_sure() {
    let mut params = AmdParameters::default();
    params.total_analysis_time = 1000;
    let (mut session, _) = new_session(params);

    let result = run_until_verdict(&mut session, std::iter::repeat_with(silent).take(500));
    // 8000 samples / 160 per frame
    assert_eq!(result, Some((50, Verdict::not_sure())));
    assert_eq!(session.samples_seen(), 8000);
}

#[test]
fn sustained_voice_is_max_word_length() {
    let mut params = AmdParameters::default();
    params.maximum_word_length = 1000;
    params.greeting = 6000;
    params.maximum_number_of_words = 10;
    let (mut session, _) = new_session(params);

    let result = run_until_verdict(&mut session, std::iter::repeat_with(voiced).take(500));
    assert_eq!(result, Some((50, Verdict::from_cause(Cause::MaxWordLength))));
}

#[test]
fn max_word_length_beats_long_greeting_on_the_same_frame() {
    let mut params = AmdParameters::default();
    params.maximum_word_length = 1000;
    params.greeting = 1000;
    let (mut session, _) = new_session(params);

    let result = run_until_verdict(&mut session, std::iter::repeat_with(voiced).take(500));
    assert!(session.state().in_greeting());
    assert_eq!(result, Some((50, Verdict::from_cause(Cause::MaxWordLength))));
}

#[test]
fn override_string_keeps_prior_value_for_rejected_pairs() {
    let out = apply_overrides(
        &AmdParameters::default(),
        "initial_silence=2000;bogus=5;silence_threshold=-1",
    );
    assert_eq!(out.params.initial_silence, 2000);
    assert_eq!(out.params.silence_threshold, 256);
    let mut expected = AmdParameters::default();
    expected.initial_silence = 2000;
    assert_eq!(out.params, expected);
}

#[test]
fn human_greeting_then_pause() {
    let (mut session, seen) = new_session(AmdParameters::default());
    // 300 ms ring-back tail, a 400 ms "hello", then waiting
    let frames = std::iter::repeat_with(silent)
        .take(15)
        .chain(std::iter::repeat_with(voiced).take(20))
        .chain(std::iter::repeat_with(silent).take(100));

    let (_, verdict) = run_until_verdict(&mut session, frames).expect("verdict");
    assert_eq!(verdict, Verdict::from_cause(Cause::SilenceAfterGreeting));
    assert_eq!(session.state().words(), 1);
    assert_eq!(seen.lock()[0].result, Decision::Human);
}

#[test]
fn chatty_machine_greeting_is_max_words() {
    let (mut session, _) = new_session(AmdParameters::default());
    // "Hi... you've... reached..." : 200 ms words separated by 100 ms gaps
    let mut frames = Vec::new();
    for _ in 0..6 {
        frames.extend(std::iter::repeat_with(silent).take(5));
        frames.extend(std::iter::repeat_with(voiced).take(10));
    }

    let (_, verdict) = run_until_verdict(&mut session, frames).expect("verdict");
    assert_eq!(verdict, Verdict::from_cause(Cause::MaxWords));
    assert_eq!(session.state().words(), 3);
}

#[test]
fn verdict_is_write_once_across_frames_and_close() {
    let (mut session, seen) = new_session(AmdParameters::default());
    let first = run_until_verdict(&mut session, std::iter::repeat_with(voiced).take(500))
        .expect("verdict")
        .1;

    for _ in 0..200 {
        assert_eq!(session.on_frame(&silent()), FrameOutcome::Inert);
    }
    assert_eq!(session.on_close().verdict(), first);
    assert_eq!(session.on_close().verdict(), first);
    assert_eq!(session.verdict(), Some(first));
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn budget_dominates_whenever_it_is_reached_first() {
    let budget_frames = 1000 * (RATE as usize / 1000) / FRAME;
    for seed in 0..64u64 {
        let mut params = AmdParameters::default();
        params.total_analysis_time = 1000;
        let (mut session, _) = new_session(params);

        let mut rng = Lcg(seed);
        let frames = std::iter::repeat_with(|| if rng.next_bool() { voiced() } else { silent() })
            .take(budget_frames * 2);

        let (index, verdict) = run_until_verdict(&mut session, frames).expect("verdict");
        assert!(index <= budget_frames, "seed {seed}: decided late at {index}");
        if index == budget_frames {
            assert_eq!(verdict, Verdict::not_sure(), "seed {seed}");
        } else {
            assert_ne!(verdict.cause, Cause::TooLong, "seed {seed}");
        }
    }
}

#[test]
fn words_and_phases_only_move_through_their_rules() {
    for seed in 0..64u64 {
        let mut params = AmdParameters::default();
        params.maximum_number_of_words = u32::MAX;
        params.maximum_word_length = u32::MAX;
        params.greeting = u32::MAX;
        params.initial_silence = u32::MAX;
        params.after_greeting_silence = u32::MAX;
        let mut machine = PhaseStateMachine::new(params);
        let mut rng = Lcg(seed);
        let mut greeting_entries = 0;

        for _ in 0..400 {
            let label = if rng.next_bool() {
                FrameLabel::Voiced
            } else {
                FrameLabel::Silence
            };
            let (words, state, phase) = (machine.words(), machine.word_state(), machine.phase());

            assert_eq!(machine.step(label, 20), None);

            let counted = state == WordState::InSilence && machine.word_state() == WordState::InWord;
            assert_eq!(machine.words(), words + u32::from(counted), "seed {seed}");
            if counted {
                assert_eq!(label, FrameLabel::Voiced);
            }

            if phase != machine.phase() {
                assert_eq!(phase, Phase::PreGreeting);
                assert_eq!(machine.phase(), Phase::Greeting);
                assert_eq!(label, FrameLabel::Voiced);
                greeting_entries += 1;
            }
        }
        assert!(greeting_entries <= 1);
    }
}
