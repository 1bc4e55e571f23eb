//! Phase-aware word tracker: accumulates silence / voice time per frame and
//! decides whether any answering-machine rule fires.
//!
//! ## Rules (first match wins, at most one verdict per frame)
//!
//! ```text
//! Silence: silence += ms
//!          silence >= between_words_silence → InSilence, voice = 0
//!          PreGreeting && silence >= initial_silence         → HUMAN/INITIALSILENCE
//!          Greeting    && silence >= after_greeting_silence  → HUMAN/SILENCEAFTERGREETING
//!
//! Voiced:  voice += ms
//!          voice >= min_word_length && InSilence → words += 1, InWord
//!          voice >= maximum_word_length          → MACHINE/MAXWORDLENGTH
//!          words >= maximum_number_of_words      → MACHINE/MAXWORDS
//!          Greeting && voice >= greeting         → MACHINE/LONGGREETING
//!          voice >= min_word_length              → silence = 0, PreGreeting → Greeting
//! ```

use tracing::debug;

use crate::config::AmdParameters;
use crate::ipc::events::Cause;
use crate::vad::FrameLabel;

/// Where the remote party is in the expected call structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No sustained talk yet.
    PreGreeting,
    /// First sustained talk seen; assumed to be a greeting.
    Greeting,
    /// The greeting ended with a pause; the body of the call follows.
    Body,
}

/// Local talk / silence state, independent of the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordState {
    InWord,
    InSilence,
}

/// Duration tracker plus phase state machine for one call.
#[derive(Debug, Clone)]
pub struct PhaseStateMachine {
    params: AmdParameters,
    phase: Phase,
    word_state: WordState,
    silence_ms: u32,
    voice_ms: u32,
    words: u32,
}

impl PhaseStateMachine {
    /// Starts in `PreGreeting` with `word_state = InWord`.
    ///
    /// The `InWord` start is deliberate: the first word is only counted after
    /// a silence of at least `between_words_silence` has been observed.
    pub fn new(params: AmdParameters) -> Self {
        Self {
            params,
            phase: Phase::PreGreeting,
            word_state: WordState::InWord,
            silence_ms: 0,
            voice_ms: 0,
            words: 0,
        }
    }

    pub fn params(&self) -> &AmdParameters {
        &self.params
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn in_initial_silence(&self) -> bool {
        self.phase == Phase::PreGreeting
    }

    pub fn in_greeting(&self) -> bool {
        self.phase == Phase::Greeting
    }

    pub fn word_state(&self) -> WordState {
        self.word_state
    }

    pub fn silence_ms(&self) -> u32 {
        self.silence_ms
    }

    pub fn voice_ms(&self) -> u32 {
        self.voice_ms
    }

    pub fn words(&self) -> u32 {
        self.words
    }

    /// Feed one labelled frame of `frame_ms` milliseconds.
    pub fn step(&mut self, label: FrameLabel, frame_ms: u32) -> Option<Cause> {
        match label {
            FrameLabel::Silence => self.on_silence(frame_ms),
            FrameLabel::Voiced => self.on_voiced(frame_ms),
        }
    }

    fn on_silence(&mut self, frame_ms: u32) -> Option<Cause> {
        let p = self.params;
        self.silence_ms = self.silence_ms.saturating_add(frame_ms);

        if self.silence_ms >= p.between_words_silence {
            if self.word_state != WordState::InSilence {
                debug!(silence_ms = self.silence_ms, "AMD: changed state to in-silence");
            }
            self.word_state = WordState::InSilence;
            self.voice_ms = 0;
        }

        if self.phase == Phase::PreGreeting && self.silence_ms >= p.initial_silence {
            debug!(
                silence_ms = self.silence_ms,
                initial_silence = p.initial_silence,
                "AMD: HUMAN"
            );
            return Some(Cause::InitialSilence);
        }

        if self.phase == Phase::Greeting && self.silence_ms >= p.after_greeting_silence {
            debug!(
                silence_ms = self.silence_ms,
                after_greeting_silence = p.after_greeting_silence,
                "AMD: HUMAN"
            );
            self.phase = Phase::Body;
            return Some(Cause::SilenceAfterGreeting);
        }

        None
    }

    fn on_voiced(&mut self, frame_ms: u32) -> Option<Cause> {
        let p = self.params;
        self.voice_ms = self.voice_ms.saturating_add(frame_ms);

        if self.voice_ms >= p.minimum_word_length && self.word_state == WordState::InSilence {
            self.words += 1;
            self.word_state = WordState::InWord;
            debug!(words = self.words, "AMD: word detected");
        }

        if self.voice_ms >= p.maximum_word_length {
            debug!(
                voice_ms = self.voice_ms,
                maximum_word_length = p.maximum_word_length,
                "AMD: MACHINE"
            );
            return Some(Cause::MaxWordLength);
        }

        if self.words >= p.maximum_number_of_words {
            debug!(
                words = self.words,
                maximum_number_of_words = p.maximum_number_of_words,
                "AMD: MACHINE"
            );
            return Some(Cause::MaxWords);
        }

        if self.phase == Phase::Greeting && self.voice_ms >= p.greeting {
            debug!(voice_ms = self.voice_ms, greeting = p.greeting, "AMD: MACHINE");
            return Some(Cause::LongGreeting);
        }

        if self.voice_ms >= p.minimum_word_length {
            if self.silence_ms > 0 {
                debug!(
                    previous_silence_ms = self.silence_ms,
                    "AMD: detected talk"
                );
            }
            self.silence_ms = 0;
            if self.phase == Phase::PreGreeting {
                debug!(voice_ms = self.voice_ms, "AMD: greeting started");
                self.phase = Phase::Greeting;
            }
        }

        None
    }
}
