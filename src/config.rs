//! Application-level configuration loading, including the runtime question bank.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use rand::{rng, seq::SliceRandom};
use serde::Deserialize;
use tracing::{info, warn};

use crate::state::game::{Difficulty, Question, QuestionOption, TOTAL_QUESTIONS};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "DUO_QUIZ_BACK_CONFIG_PATH";
/// Options a bank question must carry to be playable.
const MIN_OPTIONS: usize = 2;
const MAX_OPTIONS: usize = 6;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    questions: Vec<Question>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in default question bank.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => match build_bank(raw) {
                    Ok(questions) => {
                        info!(
                            path = %path.display(),
                            count = questions.len(),
                            "loaded question bank from config"
                        );
                        Self { questions }
                    }
                    Err(reason) => {
                        warn!(
                            path = %path.display(),
                            reason,
                            "rejected configured question bank; falling back to defaults"
                        );
                        Self::default()
                    }
                },
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// The full configured question bank.
    pub fn question_bank(&self) -> &[Question] {
        &self.questions
    }

    /// Draw `count` distinct random questions from the bank.
    ///
    /// The bank is validated to hold at least [`TOTAL_QUESTIONS`] entries at
    /// load time, so callers always receive a full set.
    pub fn sample_questions(&self, count: usize) -> Vec<Question> {
        let mut pool = self.questions.clone();
        if pool.len() > 1 {
            pool.shuffle(&mut rng());
        }
        pool.truncate(count);
        pool
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            questions: default_question_bank(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single bank question inside the configuration file.
struct RawQuestion {
    text: String,
    category: String,
    difficulty: Difficulty,
    options: Vec<String>,
}

/// Turn the raw config into a validated bank with server-assigned ids.
fn build_bank(raw: RawConfig) -> Result<Vec<Question>, &'static str> {
    if raw.questions.len() < TOTAL_QUESTIONS {
        return Err("bank holds fewer questions than a game needs");
    }

    let mut questions = Vec::with_capacity(raw.questions.len());
    for (index, question) in raw.questions.into_iter().enumerate() {
        if question.text.trim().is_empty() {
            return Err("question text must not be empty");
        }
        let option_count = question.options.len();
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&option_count) {
            return Err("each question needs between 2 and 6 options");
        }
        if question.options.iter().any(|text| text.trim().is_empty()) {
            return Err("option text must not be empty");
        }

        questions.push(Question {
            id: index as u32,
            text: question.text,
            category: question.category,
            difficulty: question.difficulty,
            options: question
                .options
                .into_iter()
                .enumerate()
                .map(|(option_index, text)| QuestionOption {
                    id: option_index as u32,
                    text,
                })
                .collect(),
        });
    }

    Ok(questions)
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in question bank shipped with the binary.
fn default_question_bank() -> Vec<Question> {
    let entries: Vec<(&str, &str, Difficulty, [&str; 4])> = vec![
        (
            "Which cuisine wins for a night out?",
            "food",
            Difficulty::Easy,
            ["Italian", "Japanese", "Mexican", "Indian"],
        ),
        (
            "Pick a breakfast.",
            "food",
            Difficulty::Easy,
            ["Pancakes", "Eggs and bacon", "Fruit and yogurt", "Just coffee"],
        ),
        (
            "What does the dream holiday look like?",
            "travel",
            Difficulty::Medium,
            ["Beach resort", "City break", "Mountain cabin", "Road trip"],
        ),
        (
            "You both move abroad for a year. Where to?",
            "travel",
            Difficulty::Hard,
            ["Tokyo", "Lisbon", "New York", "Sydney"],
        ),
        (
            "Movie night genre?",
            "entertainment",
            Difficulty::Easy,
            ["Comedy", "Thriller", "Science fiction", "Documentary"],
        ),
        (
            "The perfect Saturday evening is...",
            "entertainment",
            Difficulty::Medium,
            ["A concert", "Board games", "A long dinner out", "Couch and a series"],
        ),
        (
            "Early bird or night owl?",
            "lifestyle",
            Difficulty::Easy,
            ["Early bird", "Night owl", "Depends on the week", "Neither, honestly"],
        ),
        (
            "The ideal pet?",
            "lifestyle",
            Difficulty::Medium,
            ["A dog", "A cat", "Something exotic", "No pets"],
        ),
        (
            "What matters most in a partner?",
            "values",
            Difficulty::Hard,
            ["Humor", "Honesty", "Ambition", "Kindness"],
        ),
        (
            "An unexpected windfall lands. First move?",
            "values",
            Difficulty::Medium,
            ["Save it", "Book a trip", "Invest it", "Treat friends and family"],
        ),
        (
            "Dishes policy?",
            "habits",
            Difficulty::Easy,
            [
                "Right after eating",
                "Before bed",
                "Next morning",
                "Dishwasher or nothing",
            ],
        ),
        (
            "Phone at the dinner table?",
            "habits",
            Difficulty::Medium,
            [
                "Never",
                "Emergencies only",
                "Quick checks are fine",
                "Always reachable",
            ],
        ),
    ];

    entries
        .into_iter()
        .enumerate()
        .map(|(index, (text, category, difficulty, options))| Question {
            id: index as u32,
            text: text.into(),
            category: category.into(),
            difficulty,
            options: options
                .into_iter()
                .enumerate()
                .map(|(option_index, text)| QuestionOption {
                    id: option_index as u32,
                    text: text.into(),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bank_is_large_enough_for_a_game() {
        let config = AppConfig::default();
        assert!(config.question_bank().len() >= TOTAL_QUESTIONS);
    }

    #[test]
    fn default_bank_questions_are_well_formed() {
        for question in AppConfig::default().question_bank() {
            assert!(!question.text.trim().is_empty());
            assert!((MIN_OPTIONS..=MAX_OPTIONS).contains(&question.options.len()));
            assert!(!question.category.trim().is_empty());
        }
    }

    #[test]
    fn sampling_draws_distinct_questions() {
        let config = AppConfig::default();
        let sampled = config.sample_questions(TOTAL_QUESTIONS);
        assert_eq!(sampled.len(), TOTAL_QUESTIONS);

        let mut ids: Vec<u32> = sampled.iter().map(|question| question.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), TOTAL_QUESTIONS);
    }

    #[test]
    fn undersized_configured_bank_is_rejected() {
        let raw = RawConfig {
            questions: vec![RawQuestion {
                text: "only one".into(),
                category: "misc".into(),
                difficulty: Difficulty::Easy,
                options: vec!["a".into(), "b".into()],
            }],
        };
        assert!(build_bank(raw).is_err());
    }
}
