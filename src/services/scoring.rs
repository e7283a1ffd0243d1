//! Pure scoring functions shared by every mode. No state, no IO; the
//! coordinator applies the results inside a store transaction.

use crate::state::game::{Difficulty, Judgment};

/// Answering within this fraction of the window earns the full speed bonus.
const FAST_RATIO: f32 = 0.33;
/// Answering within this fraction of the window earns the reduced bonus.
const BRISK_RATIO: f32 = 0.66;

/// Base points for a question of the given difficulty.
pub fn base_points(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 10,
        Difficulty::Medium => 15,
        Difficulty::Hard => 20,
    }
}

/// Speed multiplier for a timed answer.
///
/// The ratio buckets are closed on the right: exactly a third of the window
/// still earns the full bonus, exactly two thirds the reduced one.
pub fn speed_multiplier(time_spent_secs: f32, window_secs: f32) -> f32 {
    if window_secs <= 0.0 {
        return 1.0;
    }
    let ratio = time_spent_secs / window_secs;
    if ratio <= FAST_RATIO {
        1.5
    } else if ratio <= BRISK_RATIO {
        1.25
    } else {
        1.0
    }
}

/// Points for a timed answer, rounded to the nearest integer.
pub fn timed_points(difficulty: Difficulty, time_spent_secs: f32, window_secs: f32) -> u32 {
    (base_points(difficulty) as f32 * speed_multiplier(time_spent_secs, window_secs)).round() as u32
}

/// Points credited to the responder for a custom-mode judgment.
pub fn judgment_points(judgment: Judgment) -> u32 {
    match judgment {
        Judgment::Correct => 10,
        Judgment::Almost => 5,
        Judgment::Incorrect => 0,
    }
}
