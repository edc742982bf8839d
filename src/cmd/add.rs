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

use crate::error::Fallible;
use crate::learner::Learner;
use crate::types::skill_id::SkillId;
use crate::types::timestamp::Timestamp;

/// Create New cards for the given skills. Skills that already have a card
/// are left alone. Returns the number of cards created.
pub fn add_skills(learner: &mut Learner, skills: &[SkillId], now: Timestamp) -> Fallible<usize> {
    let mut added = 0;
    for skill_id in skills {
        if learner.card(skill_id)?.is_some() {
            log::debug!("Skill {skill_id} already has a card");
            continue;
        }
        let card = learner.scheduler.create_card(now);
        learner.db.save_card(&learner.user_id, skill_id, &card)?;
        added += 1;
    }
    Ok(added)
}
