//! Improv Game State Machine
//!
//! A turn-limited improvisation game driven by an explicit phase machine:
//! `intro` captures the player's name, `awaiting_improv` collects scene
//! utterances until an end-of-scene signal, and `done` is terminal unless
//! the player restarts. Phase transitions are deterministic; only the
//! reaction and closing-remark text is randomized, behind an injectable RNG
//! so tests can pin outputs.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Current state of the game flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Intro,
    AwaitingImprov,
    Done,
}

/// A completed round: immutable once appended to the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovRound {
    pub scenario: String,
    pub utterances: Vec<String>,
    pub reaction: String,
    pub completed_at: DateTime<Utc>,
}

/// Fixed scenario pool; round `n` plays entry `(n - 1) mod len`.
const SCENARIOS: &[&str] = &[
    "You are a barista who just realized the espresso machine is sentient.",
    "You are an astronaut giving a house tour of the International Space Station to your in-laws.",
    "You are a medieval knight explaining to your boss why the dragon is now your roommate.",
    "You are a weather reporter live on air as it starts raining soup.",
    "You are a museum guide who has forgotten everything about the exhibit.",
];

/// Phrases that explicitly end a scene.
const END_PHRASES: &[&str] = &["end scene", "done", "okay", "that's it", "thats it", "finished", "the end"];

const RESTART_PHRASES: &[&str] = &["restart", "play again", "start over"];

const POSITIVE_REACTIONS: &[&str] = &[
    "Brilliant! You fully committed to that one.",
    "That was fantastic, what a choice!",
    "Standing ovation from me. Loved every beat.",
];

const TEASE_REACTIONS: &[&str] = &[
    "Bold. Questionable, but bold.",
    "Well, nobody can accuse you of playing it safe.",
    "I have so many questions, and I'm keeping all of them.",
];

const CONSTRUCTIVE_REACTIONS: &[&str] = &[
    "Good instincts. Next time, let the silence breathe a little.",
    "Nice build. Try grounding the scene with one concrete detail.",
    "Solid work. A stronger ending would really land it.",
];

const AMUSED_REACTIONS: &[&str] = &[
    "I genuinely cackled.",
    "I did not see that coming, and I love it.",
    "Okay, that got me.",
];

const CONTINUERS: &[&str] = &[
    "Yes, and? Keep going!",
    "I'm hooked. What happens next?",
    "Don't stop now!",
];

const CLOSING_REMARKS: &[&str] = &[
    "What a show! Here are your highlights:",
    "That's a wrap! Your best moments:",
    "Bravo! Let's relive the highlights:",
];

/// One improv session per conversation; mutated every turn, discarded on
/// conversation end or explicit restart.
pub struct ImprovSession {
    player_name: Option<String>,
    current_round: u32,
    max_rounds: u32,
    phase: Phase,
    scenario: Option<String>,
    buffer: Vec<String>,
    turns_in_round: u32,
    rounds: Vec<ImprovRound>,
    rng: Box<dyn RngCore + Send>,
}

impl ImprovSession {
    /// Production constructor: process RNG, no persisted seed.
    pub fn new(max_rounds: u32) -> Self {
        Self::with_rng(max_rounds, StdRng::from_os_rng())
    }

    /// Test constructor with an injected randomness source.
    pub fn with_rng(max_rounds: u32, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            player_name: None,
            current_round: 0,
            max_rounds: max_rounds.max(1),
            phase: Phase::Intro,
            scenario: None,
            buffer: Vec::new(),
            turns_in_round: 0,
            rounds: Vec::new(),
            rng: Box::new(rng),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    pub fn rounds(&self) -> &[ImprovRound] {
        &self.rounds
    }

    /// The opening line sent before the player has said anything.
    pub fn greeting(&self) -> String {
        match &self.player_name {
            Some(name) => format!(
                "Welcome back to the improv stage, {name}! What's your name this time?"
            ),
            None => "Welcome to the improv stage! What's your name?".to_string(),
        }
    }

    /// Advances the machine by one utterance and returns the host's reply.
    pub fn handle_turn(&mut self, text: &str) -> String {
        let utterance = text.trim();
        if utterance.is_empty() {
            return match self.phase {
                Phase::Intro => "I didn't catch that. What's your name?".to_string(),
                Phase::AwaitingImprov => "The stage is yours. Say something!".to_string(),
                Phase::Done => "The show is over. Say 'play again' for another run.".to_string(),
            };
        }

        match self.phase {
            Phase::Intro => self.handle_intro(utterance),
            Phase::AwaitingImprov => self.handle_scene(utterance),
            Phase::Done => self.handle_done(utterance),
        }
    }

    fn handle_intro(&mut self, utterance: &str) -> String {
        let name = capitalize(utterance.split_whitespace().next().unwrap_or("Player"));
        self.player_name = Some(name.clone());
        self.phase = Phase::AwaitingImprov;
        self.current_round = 1;
        self.scenario = Some(scenario_for_round(1).to_string());
        self.buffer.clear();
        self.turns_in_round = 0;
        debug!(player = %name, "improv session started");
        format!(
            "Great to meet you, {name}! Round 1 of {}. Your scene: {} Take it away!",
            self.max_rounds,
            self.scenario.as_deref().unwrap_or_default(),
        )
    }

    fn handle_scene(&mut self, utterance: &str) -> String {
        self.buffer.push(utterance.to_string());
        self.turns_in_round += 1;

        if !self.is_end_of_scene(utterance) {
            let nudge = CONTINUERS
                .choose(&mut *self.rng)
                .copied()
                .unwrap_or("Keep going!");
            return nudge.to_string();
        }

        let reaction = self.build_reaction();
        self.rounds.push(ImprovRound {
            scenario: self.scenario.take().unwrap_or_default(),
            utterances: std::mem::take(&mut self.buffer),
            reaction: reaction.clone(),
            completed_at: Utc::now(),
        });
        self.turns_in_round = 0;

        if self.current_round >= self.max_rounds {
            self.phase = Phase::Done;
            debug!(rounds = self.rounds.len(), "improv session complete");
            format!("{reaction}\n\n{}", self.closing_summary())
        } else {
            self.current_round += 1;
            let scenario = scenario_for_round(self.current_round);
            self.scenario = Some(scenario.to_string());
            format!(
                "{reaction} Round {} of {}: {scenario}",
                self.current_round, self.max_rounds
            )
        }
    }

    fn handle_done(&mut self, utterance: &str) -> String {
        let lowered = utterance.to_lowercase();
        if RESTART_PHRASES.iter().any(|p| lowered.contains(p)) {
            // Back to intro; the player name and the randomness source
            // carry over, everything else resets.
            self.phase = Phase::Intro;
            self.current_round = 0;
            self.scenario = None;
            self.buffer.clear();
            self.turns_in_round = 0;
            self.rounds.clear();
            return self.greeting();
        }
        "The curtain has fallen! Say 'play again' if you want another run.".to_string()
    }

    /// End-of-scene: an explicit end phrase, or a terse reply (at most three
    /// tokens) after at least two turns in the round. The terse-reply
    /// heuristic can misfire on a short in-character line; that trade-off is
    /// accepted.
    fn is_end_of_scene(&self, utterance: &str) -> bool {
        let lowered = utterance.to_lowercase();
        if END_PHRASES.iter().any(|p| contains_phrase(&lowered, p)) {
            return true;
        }
        self.turns_in_round >= 2 && lowered.split_whitespace().count() <= 3
    }

    /// One of four tones, one template per tone, plus a literal quote of the
    /// round's final utterance when it is short enough to echo.
    fn build_reaction(&mut self) -> String {
        let pool = match self.rng.next_u32() % 4 {
            0 => POSITIVE_REACTIONS,
            1 => TEASE_REACTIONS,
            2 => CONSTRUCTIVE_REACTIONS,
            _ => AMUSED_REACTIONS,
        };
        let template = pool.choose(&mut *self.rng).copied().unwrap_or("Nice work!");
        match self.buffer.last() {
            Some(last) if last.split_whitespace().count() <= 8 => {
                format!("{template} \"{last}\"")
            }
            _ => template.to_string(),
        }
    }

    /// One highlight line per completed round, prefixed by a closing remark.
    pub fn closing_summary(&mut self) -> String {
        if self.rounds.is_empty() {
            return "We never got a scene going. Come back any time!".to_string();
        }
        let remark = CLOSING_REMARKS
            .choose(&mut *self.rng)
            .copied()
            .unwrap_or("Highlights:");
        let highlights: Vec<String> = self
            .rounds
            .iter()
            .enumerate()
            .map(|(i, round)| {
                let line = round
                    .utterances
                    .last()
                    .map(String::as_str)
                    .unwrap_or("(a moment of silence)");
                format!("Round {}: \"{}\"", i + 1, line)
            })
            .collect();
        format!("{remark}\n{}", highlights.join("\n"))
    }
}

fn scenario_for_round(round: u32) -> &'static str {
    SCENARIOS[((round.max(1) - 1) as usize) % SCENARIOS.len()]
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Phrase containment on word boundaries, so "done" does not fire inside
/// "abandoned".
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let tokens: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .collect();
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    if needle.is_empty() || needle.len() > tokens.len() {
        return false;
    }
    (0..=tokens.len() - needle.len())
        .any(|start| tokens[start..start + needle.len()] == needle[..])
}
