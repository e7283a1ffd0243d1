//! Post-hoc compatibility statistics over the two players' answer sets.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    dto::game::{CategoryCompatibility, CompatibilityReport},
    error::GameError,
    state::{SharedState, game::Game},
};

/// Compute the compatibility breakdown for a game.
///
/// Pure over the document: the overall percentage is
/// `100 * matching / min(answers1, answers2)` (0 when no common answers
/// exist), and per-category ratios are grouped in question order. Best and
/// worst categories break ties by whichever category was encountered first —
/// an explicit, arbitrary choice.
pub fn analyze(game: &Game) -> CompatibilityReport {
    let (Some(first), Some(second)) = (game.players.first(), game.players.get(1)) else {
        return CompatibilityReport::empty();
    };

    let compared = first.answers.len().min(second.answers.len());
    let mut matched = 0;
    let mut categories: IndexMap<&str, (usize, usize)> = IndexMap::new();

    for index in 0..compared {
        let hit = first.answers[index].choice == second.answers[index].choice;
        if hit {
            matched += 1;
        }
        let category = game
            .questions
            .get(index)
            .map(|question| question.category.as_str())
            .unwrap_or("uncategorized");
        let entry = categories.entry(category).or_insert((0, 0));
        entry.1 += 1;
        if hit {
            entry.0 += 1;
        }
    }

    let per_category: Vec<CategoryCompatibility> = categories
        .into_iter()
        .map(|(category, (matched, compared))| CategoryCompatibility {
            category: category.to_owned(),
            matched,
            compared,
            percent: percent(matched, compared),
        })
        .collect();

    let mut best: Option<&CategoryCompatibility> = None;
    let mut worst: Option<&CategoryCompatibility> = None;
    for entry in &per_category {
        if best.is_none_or(|current| entry.percent > current.percent) {
            best = Some(entry);
        }
        if worst.is_none_or(|current| entry.percent < current.percent) {
            worst = Some(entry);
        }
    }

    CompatibilityReport {
        overall_percent: percent(matched, compared),
        matched,
        compared,
        best_category: best.map(|entry| entry.category.clone()),
        worst_category: worst.map(|entry| entry.category.clone()),
        per_category,
    }
}

/// Fetch a game and compute its compatibility report.
pub async fn report(state: &SharedState, game_id: Uuid) -> Result<CompatibilityReport, GameError> {
    let game = state.find_game(game_id).await?;
    Ok(analyze(&game))
}

fn percent(matched: usize, compared: usize) -> f32 {
    if compared == 0 {
        0.0
    } else {
        100.0 * matched as f32 / compared as f32
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::state::game::{
        Answer, AnswerOutcome, Difficulty, Game, GameMode, Player, Question, QuestionOption,
    };

    fn question(id: u32, category: &str) -> Question {
        Question {
            id,
            text: format!("question {id}"),
            category: category.into(),
            difficulty: Difficulty::Easy,
            options: (0..4)
                .map(|option_id| QuestionOption {
                    id: option_id,
                    text: format!("option {option_id}"),
                })
                .collect(),
        }
    }

    fn answer(question_index: usize, choice: u32) -> Answer {
        Answer {
            question_id: question_index as u32,
            question_index,
            choice,
            time_spent_secs: Some(5.0),
            outcome: AnswerOutcome::Pending,
            submitted_at: SystemTime::now(),
        }
    }

    fn game_with_answers(categories: &[&str], first: &[u32], second: &[u32]) -> Game {
        let host = Player::new(Uuid::new_v4(), "ana".into(), None);
        let questions = categories
            .iter()
            .enumerate()
            .map(|(index, category)| question(index as u32, category))
            .collect();
        let mut game = Game::new("ABCDEF".into(), host, GameMode::Competitive, questions);
        game.players
            .push(Player::new(Uuid::new_v4(), "bo".into(), None));

        for (index, choice) in first.iter().enumerate() {
            game.players[0].push_answer(answer(index, *choice)).unwrap();
        }
        for (index, choice) in second.iter().enumerate() {
            game.players[1].push_answer(answer(index, *choice)).unwrap();
        }
        game
    }

    #[test]
    fn overall_uses_the_shorter_answer_list() {
        // Second player only answered three questions; 2 of those 3 match.
        let game = game_with_answers(
            &["food", "food", "travel", "travel"],
            &[0, 1, 2, 3],
            &[0, 1, 3],
        );
        let report = analyze(&game);
        assert_eq!(report.compared, 3);
        assert_eq!(report.matched, 2);
        assert!((report.overall_percent - 200.0 / 3.0).abs() < 0.001);
    }

    #[test]
    fn percentages_stay_in_range() {
        let all_match = analyze(&game_with_answers(&["a", "b"], &[1, 1], &[1, 1]));
        assert_eq!(all_match.overall_percent, 100.0);

        let none_match = analyze(&game_with_answers(&["a", "b"], &[1, 1], &[2, 2]));
        assert_eq!(none_match.overall_percent, 0.0);
    }

    #[test]
    fn no_common_answers_yields_an_empty_report() {
        let game = game_with_answers(&["a"], &[], &[]);
        let report = analyze(&game);
        assert_eq!(report.compared, 0);
        assert_eq!(report.overall_percent, 0.0);
        assert!(report.best_category.is_none());
        assert!(report.worst_category.is_none());
    }

    #[test]
    fn per_category_grouping_and_extremes() {
        // food: 2/2 matches, travel: 0/2.
        let game = game_with_answers(
            &["food", "food", "travel", "travel"],
            &[0, 1, 2, 3],
            &[0, 1, 0, 0],
        );
        let report = analyze(&game);

        assert_eq!(report.per_category.len(), 2);
        assert_eq!(report.per_category[0].category, "food");
        assert_eq!(report.per_category[0].percent, 100.0);
        assert_eq!(report.per_category[1].category, "travel");
        assert_eq!(report.per_category[1].percent, 0.0);
        assert_eq!(report.best_category.as_deref(), Some("food"));
        assert_eq!(report.worst_category.as_deref(), Some("travel"));
    }

    #[test]
    fn ties_break_on_the_first_encountered_category() {
        // Both categories sit at 50%.
        let game = game_with_answers(
            &["food", "food", "travel", "travel"],
            &[0, 1, 2, 3],
            &[0, 9, 2, 9],
        );
        let report = analyze(&game);
        assert_eq!(report.best_category.as_deref(), Some("food"));
        assert_eq!(report.worst_category.as_deref(), Some("food"));
    }
}
