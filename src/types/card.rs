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

use serde::Deserialize;
use serde::Serialize;

use crate::error::ScheduleError;
use crate::fsrs::Difficulty;
use crate::fsrs::MAX_DIFFICULTY;
use crate::fsrs::MIN_DIFFICULTY;
use crate::fsrs::Stability;
use crate::fsrs::T;
use crate::types::card_state::CardState;
use crate::types::timestamp::Timestamp;

/// The memory state of one skill.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Days until retrievability decays to 90%.
    pub stability: Stability,
    /// Intrinsic hardness, in `[1, 10]`.
    pub difficulty: Difficulty,
    /// When the card should next be presented.
    pub due: Timestamp,
    /// When the card was last graded, if ever.
    pub last_review: Option<Timestamp>,
    /// Days between the previous review and the one that produced this state.
    pub elapsed_days: T,
    /// Number of Hard, Good, or Easy grades.
    pub reps: u32,
    /// Number of times the card was forgotten while in review.
    pub lapses: u32,
    pub state: CardState,
    /// The learning or relearning step, while in one of those states.
    pub step: Option<u32>,
}

impl Card {
    /// Rejects cards no sequence of reviews could have produced.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        let invalid = |msg: String| Err(ScheduleError::InvalidCardState(msg));
        if !self.stability.is_finite() || self.stability <= 0.0 {
            return invalid(format!("stability must be positive, got {}", self.stability));
        }
        if !self.difficulty.is_finite()
            || !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty)
        {
            return invalid(format!(
                "difficulty must be in [{MIN_DIFFICULTY}, {MAX_DIFFICULTY}], got {}",
                self.difficulty
            ));
        }
        if !self.elapsed_days.is_finite() || self.elapsed_days < 0.0 {
            return invalid(format!(
                "elapsed days must not be negative, got {}",
                self.elapsed_days
            ));
        }
        match (self.state, self.last_review) {
            (CardState::New, Some(_)) => {
                return invalid("a new card cannot have a last review".to_string());
            }
            (CardState::New, None) => {
                if self.reps > 0 || self.lapses > 0 {
                    return invalid("a new card cannot have a review history".to_string());
                }
            }
            (state, None) => {
                return invalid(format!("a {state} card must have a last review"));
            }
            (_, Some(last_review)) => {
                if self.due < last_review {
                    return invalid(format!(
                        "due date {} precedes last review {last_review}",
                        self.due
                    ));
                }
            }
        }
        match self.state {
            CardState::Learning | CardState::Relearning => {
                if self.step.is_none() {
                    return invalid(format!("a {} card must have a step", self.state));
                }
            }
            CardState::New | CardState::Review => {}
        }
        if self.state == CardState::Relearning && self.lapses == 0 {
            return invalid("a relearning card must have at least one lapse".to_string());
        }
        Ok(())
    }
}
