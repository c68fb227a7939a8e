//! Audio cues and ambient music
//!
//! Tones are abstract (frequency + duration); an `AudioEngine` plays them on a
//! background thread through a `ToneOutput`. Cues queue up FIFO and always
//! interrupt the ambient loop between notes.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::seq::IndexedRandom;

/// Background music flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MusicMode {
    /// Nothing plays
    #[default]
    Silence,
    /// Low sustained hum
    Drone,
    /// Bright broken chords
    Arpeggio,
    /// Short punchy notes
    Action,
}

/// One-shot jingles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Game begins
    Start,
    /// Good score or new record
    Win,
    /// Poor score
    GameOver,
}

/// A single tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub freq_hz: u32,
    pub duration_ms: u64,
}

const fn note(freq_hz: u32, duration_ms: u64) -> Note {
    Note {
        freq_hz,
        duration_ms,
    }
}

const START: [Note; 3] = [note(440, 100), note(554, 100), note(659, 200)];
const GAME_OVER: [Note; 3] = [note(400, 150), note(300, 150), note(200, 400)];
const WIN: [Note; 4] = [note(523, 100), note(659, 100), note(783, 100), note(1046, 300)];

/// Idle step while silent
const SILENCE_MS: u64 = 200;

impl Cue {
    pub fn notes(&self) -> &'static [Note] {
        match self {
            Cue::Start => &START,
            Cue::Win => &WIN,
            Cue::GameOver => &GAME_OVER,
        }
    }
}

/// How one ambient step sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbientStep {
    /// Candidate pitches, one chosen at random per step
    pub pitches: &'static [u32],
    pub duration_ms: u64,
    /// Pause after the note
    pub rest_ms: u64,
}

impl MusicMode {
    /// None for silence
    pub fn ambient(&self) -> Option<AmbientStep> {
        match self {
            MusicMode::Silence => None,
            MusicMode::Drone => Some(AmbientStep {
                pitches: &[100, 110, 120, 130],
                duration_ms: 600,
                rest_ms: 0,
            }),
            MusicMode::Arpeggio => Some(AmbientStep {
                pitches: &[523, 659, 783, 1046],
                duration_ms: 200,
                rest_ms: 100,
            }),
            MusicMode::Action => Some(AmbientStep {
                pitches: &[200, 250, 300],
                duration_ms: 100,
                rest_ms: 0,
            }),
        }
    }
}

/// Anything that can take music and cue requests
pub trait AudioSink {
    fn set_mode(&mut self, mode: MusicMode);
    fn play_cue(&mut self, cue: Cue);

    /// Release the output; later calls are ignored
    fn shutdown(&mut self) {}
}

/// Sound device. `beep` blocks for the length of the tone.
pub trait ToneOutput: Send {
    fn beep(&mut self, freq_hz: u32, duration_ms: u64);

    fn rest(&mut self, duration_ms: u64) {
        thread::sleep(Duration::from_millis(duration_ms));
    }
}

/// Headless output: logs tones and waits out their duration
#[derive(Debug, Default)]
pub struct LogTone;

impl ToneOutput for LogTone {
    fn beep(&mut self, freq_hz: u32, duration_ms: u64) {
        log::trace!("beep {freq_hz} Hz for {duration_ms} ms");
        thread::sleep(Duration::from_millis(duration_ms));
    }
}

/// Sink that drops everything
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn set_mode(&mut self, _mode: MusicMode) {}
    fn play_cue(&mut self, _cue: Cue) {}
}

enum Command {
    Mode(MusicMode),
    Cue(Cue),
    Stop,
}

/// Audio thread handle
pub struct AudioEngine {
    tx: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
    muted: bool,
}

impl AudioEngine {
    /// Spawn the audio thread
    pub fn start(output: impl ToneOutput + 'static) -> Self {
        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("audio".into())
            .spawn(move || run(output, rx));
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Failed to start audio thread - audio disabled: {e}");
                None
            }
        };
        Self {
            tx: Some(tx),
            worker,
            muted: false,
        }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.send(Command::Mode(MusicMode::Silence));
        }
    }

    /// Stop the thread and wait for the current note to finish
    pub fn stop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Command::Stop);
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Audio thread panicked");
            }
        }
    }

    fn send(&self, command: Command) {
        if self.worker.is_none() {
            return;
        }
        if let Some(tx) = &self.tx {
            if tx.send(command).is_err() {
                log::warn!("Audio thread is gone");
            }
        }
    }
}

impl AudioSink for AudioEngine {
    fn set_mode(&mut self, mode: MusicMode) {
        if !self.muted {
            self.send(Command::Mode(mode));
        }
    }

    fn play_cue(&mut self, cue: Cue) {
        if !self.muted {
            self.send(Command::Cue(cue));
        }
    }

    fn shutdown(&mut self) {
        self.stop();
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Apply a command. Returns false on stop.
fn apply(command: Command, mode: &mut MusicMode, cues: &mut VecDeque<Cue>) -> bool {
    match command {
        Command::Mode(m) => {
            log::debug!("Music mode {m:?}");
            *mode = m;
        }
        Command::Cue(cue) => cues.push_back(cue),
        Command::Stop => return false,
    }
    true
}

fn run(mut output: impl ToneOutput, rx: Receiver<Command>) {
    let mut rng = rand::rng();
    let mut mode = MusicMode::Silence;
    let mut cues = VecDeque::new();

    loop {
        // Pick up everything sent since the last note
        loop {
            match rx.try_recv() {
                Ok(command) => {
                    if !apply(command, &mut mode, &mut cues) {
                        return;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        if let Some(cue) = cues.pop_front() {
            log::debug!("Cue {cue:?}");
            for n in cue.notes() {
                output.beep(n.freq_hz, n.duration_ms);
            }
            continue;
        }

        match mode.ambient() {
            Some(step) => {
                if let Some(&freq) = step.pitches.choose(&mut rng) {
                    output.beep(freq, step.duration_ms);
                }
                if step.rest_ms > 0 {
                    output.rest(step.rest_ms);
                }
            }
            // Wait for work instead of spinning
            None => match rx.recv_timeout(Duration::from_millis(SILENCE_MS)) {
                Ok(command) => {
                    if !apply(command, &mut mode, &mut cues) {
                        return;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            },
        }
    }
}
