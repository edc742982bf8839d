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

use crate::fsrs::Difficulty;
use crate::fsrs::Grade;
use crate::fsrs::Stability;
use crate::fsrs::T;
use crate::types::card::Card;
use crate::types::card_state::CardState;
use crate::types::timestamp::Timestamp;

/// A record of one grading event.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLog {
    pub reviewed_at: Timestamp,
    pub grade: Grade,
    /// The card's state before the review.
    pub state: CardState,
    pub elapsed_days: T,
    /// The stability after the review.
    pub stability: Stability,
    /// The difficulty after the review.
    pub difficulty: Difficulty,
    /// The due date after the review.
    pub due: Timestamp,
}

impl ReviewLog {
    pub fn new(before: &Card, grade: Grade, reviewed_at: Timestamp, after: &Card) -> Self {
        Self {
            reviewed_at,
            grade,
            state: before.state,
            elapsed_days: after.elapsed_days,
            stability: after.stability,
            difficulty: after.difficulty,
            due: after.due,
        }
    }

    /// The scheduled interval in days.
    pub fn interval_days(&self) -> T {
        self.due.days_since(self.reviewed_at)
    }
}

/// The outcome of grading a card.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub card: Card,
    pub log: ReviewLog,
}
