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

use serde::Serialize;

use crate::error::Fallible;
use crate::learner::Learner;
use crate::scheduler::is_due;
use crate::types::card_state::CardState;
use crate::types::timestamp::Timestamp;

#[derive(Serialize, Default, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    card_count: usize,
    new_count: usize,
    learning_count: usize,
    review_count: usize,
    relearning_count: usize,
    due_count: usize,
    review_log_count: usize,
}

pub fn learner_stats(learner: &Learner, now: Timestamp) -> Fallible<Stats> {
    let cards = learner.db.cards(&learner.user_id)?;
    let mut stats = Stats {
        card_count: cards.len(),
        review_log_count: learner.db.reviews(&learner.user_id)?.len(),
        ..Stats::default()
    };
    for card in cards.values() {
        match card.state {
            CardState::New => stats.new_count += 1,
            CardState::Learning => stats.learning_count += 1,
            CardState::Review => stats.review_count += 1,
            CardState::Relearning => stats.relearning_count += 1,
        }
        if is_due(card, now) {
            stats.due_count += 1;
        }
    }
    Ok(stats)
}
