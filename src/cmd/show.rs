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
use crate::fsrs::R;
use crate::learner::Learner;
use crate::scheduler::Preview;
use crate::scheduler::is_due;
use crate::types::card::Card;
use crate::types::skill_id::SkillId;
use crate::types::timestamp::Timestamp;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardReport {
    pub skill_id: SkillId,
    pub card: Card,
    pub retrievability: R,
    pub is_due: bool,
}

pub fn show_skill(learner: &Learner, skill_id: &SkillId, now: Timestamp) -> Fallible<CardReport> {
    let card = learner.existing_card(skill_id)?;
    let retrievability = learner.scheduler.retrievability(&card, now)?;
    Ok(CardReport {
        skill_id: skill_id.clone(),
        is_due: is_due(&card, now),
        card,
        retrievability,
    })
}

/// The outcome of each grade, without storing any of them.
pub fn preview_skill(learner: &Learner, skill_id: &SkillId, now: Timestamp) -> Fallible<Preview> {
    let card = learner.existing_card(skill_id)?;
    Ok(learner.scheduler.preview(&card, now)?)
}
