use crate::types::questionnaire::{Letter, QUESTION_COUNT};
use crate::types::scoring::{Assessment, Tally, Tier};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("missing answers: {answered} of {expected} questions answered")]
    MissingAnswers { answered: usize, expected: usize },

    #[error("too many answers: got {answered}, expected {expected}")]
    TooManyAnswers { answered: usize, expected: usize },
}

/// Scores one answer per question. Unanswered slots (`None`) are skipped
/// when counting, so a partially filled form reports `MissingAnswers`.
pub fn score(answers: &[Option<Letter>]) -> Result<Assessment, ScoreError> {
    let letters = answers.iter().flatten().copied().collect::<Vec<_>>();
    if letters.len() < QUESTION_COUNT {
        return Err(ScoreError::MissingAnswers {
            answered: letters.len(),
            expected: QUESTION_COUNT,
        });
    }
    if letters.len() > QUESTION_COUNT {
        return Err(ScoreError::TooManyAnswers {
            answered: letters.len(),
            expected: QUESTION_COUNT,
        });
    }

    let tally = Tally::from_letters(letters);
    Ok(Assessment {
        tier: tier_for(&tally),
        tally,
    })
}

pub fn score_letters(letters: &[Letter]) -> Result<Assessment, ScoreError> {
    let answers = letters.iter().copied().map(Some).collect::<Vec<_>>();
    score(&answers)
}

// Branch order is d, c, b, a. A tie for the maximum is won by the
// earliest branch.
pub fn tier_for(tally: &Tally) -> Tier {
    let mayor = tally.max();
    if tally.d == mayor {
        if tally.d >= tally.c {
            Tier::Transformational
        } else {
            Tier::Systematic
        }
    } else if tally.c == mayor {
        if tally.c + tally.d >= 4 && tally.d > 0 {
            Tier::Systematic
        } else {
            Tier::Operational
        }
    } else if tally.b == mayor {
        Tier::Active
    } else {
        Tier::Awareness
    }
}
