// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Card state transitions and the due-set query.
//!
//! Everything here is a pure function of its arguments: grading returns a
//! new card and never touches the one passed in, and no state is shared
//! between calls.

use chrono::Duration;
use serde::Serialize;

use crate::config::Parameters;
use crate::error::Fallible;
use crate::error::ScheduleError;
use crate::fsrs::DEFAULT_WEIGHTS;
use crate::fsrs::Difficulty;
use crate::fsrs::Grade;
use crate::fsrs::R;
use crate::fsrs::Stability;
use crate::fsrs::T;
use crate::fsrs::Weights;
use crate::fsrs::initial_difficulty;
use crate::fsrs::initial_stability;
use crate::fsrs::interval;
use crate::fsrs::new_difficulty;
use crate::fsrs::new_stability;
use crate::fsrs::retrievability;
use crate::fsrs::short_term_stability;
use crate::types::card::Card;
use crate::types::card_state::CardState;
use crate::types::review::Review;
use crate::types::review::ReviewLog;
use crate::types::skill_id::SkillId;
use crate::types::timestamp::Timestamp;

/// Learning and relearning reviews closer together than this use the
/// short-term stability update.
const SAME_DAY: T = 1.0;

#[derive(Clone, Debug)]
pub struct Scheduler {
    params: Parameters,
    weights: Weights,
}

/// What each grade would do to a card.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub again: Review,
    pub hard: Review,
    pub good: Review,
    pub easy: Review,
}

impl Preview {
    pub fn get(&self, grade: Grade) -> &Review {
        match grade {
            Grade::Again => &self.again,
            Grade::Hard => &self.hard,
            Grade::Good => &self.good,
            Grade::Easy => &self.easy,
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            params: Parameters::default(),
            weights: DEFAULT_WEIGHTS,
        }
    }
}

impl Scheduler {
    pub fn new(params: Parameters) -> Fallible<Self> {
        params.validate()?;
        let weights = params.weights()?;
        Ok(Self { params, weights })
    }

    /// A card for a skill the learner has just encountered.
    pub fn create_card(&self, now: Timestamp) -> Card {
        Card {
            stability: initial_stability(&self.weights, Grade::Good),
            difficulty: initial_difficulty(&self.weights, Grade::Good),
            due: now,
            last_review: None,
            elapsed_days: 0.0,
            reps: 0,
            lapses: 0,
            state: CardState::New,
            step: None,
        }
    }

    pub fn grade_card(
        &self,
        card: &Card,
        grade: Grade,
        now: Timestamp,
    ) -> Result<Card, ScheduleError> {
        self.review(card, grade, now).map(|review| review.card)
    }

    /// Grade a card, returning its next state along with a log entry.
    pub fn review(
        &self,
        card: &Card,
        grade: Grade,
        now: Timestamp,
    ) -> Result<Review, ScheduleError> {
        card.validate()?;
        let elapsed_days = elapsed_days(card, now);
        let (stability, difficulty) = self.next_memory(card, grade, elapsed_days);

        let (state, step, due) = match card.state {
            CardState::New | CardState::Learning => self.next_step(
                CardState::Learning,
                &self.params.learning_steps,
                card.step.unwrap_or(0),
                grade,
                stability,
                now,
            ),
            CardState::Relearning => self.next_step(
                CardState::Relearning,
                &self.params.relearning_steps,
                card.step.unwrap_or(0),
                grade,
                stability,
                now,
            ),
            CardState::Review => match (grade, self.params.relearning_steps.first()) {
                (Grade::Again, Some(&first)) => (
                    CardState::Relearning,
                    Some(0),
                    now.plus_minutes(first as i64),
                ),
                _ => (CardState::Review, None, self.review_due(stability, now)),
            },
        };

        let (reps, lapses) = match grade {
            Grade::Again if card.state == CardState::Review => (card.reps, card.lapses + 1),
            Grade::Again => (card.reps, card.lapses),
            Grade::Hard | Grade::Good | Grade::Easy => (card.reps + 1, card.lapses),
        };

        let next = Card {
            stability,
            difficulty,
            due,
            last_review: Some(now),
            elapsed_days,
            reps,
            lapses,
            state,
            step,
        };
        log::debug!(
            "{grade}: {} -> {} S={:.2}d D={:.2} due={}",
            card.state,
            next.state,
            next.stability,
            next.difficulty,
            next.due
        );
        let log = ReviewLog::new(card, grade, now, &next);
        Ok(Review { card: next, log })
    }

    pub fn preview(&self, card: &Card, now: Timestamp) -> Result<Preview, ScheduleError> {
        Ok(Preview {
            again: self.review(card, Grade::Again, now)?,
            hard: self.review(card, Grade::Hard, now)?,
            good: self.review(card, Grade::Good, now)?,
            easy: self.review(card, Grade::Easy, now)?,
        })
    }

    /// The modeled probability of recalling the card at `now`. Zero for a
    /// card that was never reviewed.
    pub fn retrievability(&self, card: &Card, now: Timestamp) -> Result<R, ScheduleError> {
        card.validate()?;
        match card.state {
            CardState::New => Ok(0.0),
            _ => Ok(retrievability(elapsed_days(card, now), card.stability)),
        }
    }

    fn next_memory(&self, card: &Card, grade: Grade, elapsed: T) -> (Stability, Difficulty) {
        let w = &self.weights;
        if card.state == CardState::New {
            return (initial_stability(w, grade), initial_difficulty(w, grade));
        }
        let (s, d) = (card.stability, card.difficulty);
        // Review cards always go through the retrievability-driven update, so
        // an early review never gains more than an on-time one.
        let stability = if card.state != CardState::Review && elapsed < SAME_DAY {
            short_term_stability(w, s, grade)
        } else {
            new_stability(w, d, s, retrievability(elapsed, s), grade)
        };
        (stability, new_difficulty(w, d, grade))
    }

    /// Walk the learning or relearning steps. Graduates to Review when the
    /// steps run out, or on Easy.
    fn next_step(
        &self,
        phase: CardState,
        steps: &[u32],
        step: u32,
        grade: Grade,
        stability: Stability,
        now: Timestamp,
    ) -> (CardState, Option<u32>, Timestamp) {
        let graduate = (CardState::Review, None, self.review_due(stability, now));
        if steps.is_empty() {
            return graduate;
        }
        let index = step as usize;
        let minutes = |i: usize| Duration::minutes(steps[i] as i64);
        match grade {
            Grade::Again => (phase, Some(0), now.plus(minutes(0))),
            Grade::Hard if index < steps.len() => {
                let wait = if index > 0 {
                    minutes(index)
                } else if steps.len() == 1 {
                    Duration::seconds(steps[0] as i64 * 90)
                } else {
                    Duration::seconds((steps[0] as i64 + steps[1] as i64) * 30)
                };
                (phase, Some(step), now.plus(wait))
            }
            Grade::Good if index + 1 < steps.len() => {
                (phase, Some(step + 1), now.plus(minutes(index + 1)))
            }
            Grade::Hard | Grade::Good | Grade::Easy => graduate,
        }
    }

    fn review_due(&self, stability: Stability, now: Timestamp) -> Timestamp {
        let days = interval(self.params.target_retention, stability)
            .round()
            .clamp(self.params.min_interval as f64, self.params.max_interval as f64);
        now.plus_days(days as i64)
    }
}

/// Days since the card's last review, or zero if it was never reviewed.
/// A review timestamped before the previous one counts as zero days.
fn elapsed_days(card: &Card, now: Timestamp) -> T {
    match card.last_review {
        None => 0.0,
        Some(last_review) => {
            let days = now.days_since(last_review);
            if days < 0.0 {
                log::warn!(
                    "Clock skew: review at {now} precedes last review at {last_review}, treating elapsed time as zero."
                );
                0.0
            } else {
                days
            }
        }
    }
}

pub fn is_due(card: &Card, now: Timestamp) -> bool {
    card.due <= now
}

/// The skills due at `now`, most overdue first. Ties are broken by skill id.
pub fn due_skill_ids<'a, I>(cards: I, now: Timestamp) -> Vec<SkillId>
where
    I: IntoIterator<Item = (&'a SkillId, &'a Card)>,
{
    let mut due: Vec<(Timestamp, &SkillId)> = cards
        .into_iter()
        .filter(|(_, card)| is_due(card, now))
        .map(|(id, card)| (card.due, id))
        .collect();
    due.sort();
    due.into_iter().map(|(_, id)| id.clone()).collect()
}
