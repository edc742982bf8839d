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
use crate::fsrs::Grade;
use crate::learner::Learner;
use crate::types::review::Review;
use crate::types::skill_id::SkillId;
use crate::types::timestamp::Timestamp;

/// Grade a skill and store the result. A skill seen for the first time gets
/// a New card before grading. The card is read and written in one
/// transaction, so concurrent graders of the same store do not lose updates.
pub fn grade_skill(
    learner: &mut Learner,
    skill_id: &SkillId,
    grade: Grade,
    now: Timestamp,
) -> Fallible<Review> {
    let Learner {
        user_id,
        db,
        scheduler,
    } = learner;
    db.review_card(user_id, skill_id, |card| {
        let card = match card {
            Some(card) => card,
            None => {
                log::debug!("First review of {skill_id}, creating card");
                scheduler.create_card(now)
            }
        };
        Ok(scheduler.review(&card, grade, now)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_database;
    use crate::types::card_state::CardState;

    #[test]
    fn test_grade_unknown_skill() -> Fallible<()> {
        let (_dir, path) = create_tmp_database()?;
        let mut learner = Learner::open(&path, "local", None)?;
        let skill = SkillId::new("vowel:chirik")?;
        let now = Timestamp::now();
        let review = grade_skill(&mut learner, &skill, Grade::Good, now)?;
        assert_eq!(review.log.state, CardState::New);
        assert_eq!(learner.card(&skill)?, Some(review.card));
        assert_eq!(learner.db.reviews("local")?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_grade_sequence() -> Fallible<()> {
        let (_dir, path) = create_tmp_database()?;
        let mut learner = Learner::open(&path, "local", None)?;
        let skill = SkillId::new("word:torah")?;
        let now = Timestamp::now();
        grade_skill(&mut learner, &skill, Grade::Good, now)?;
        let review = grade_skill(&mut learner, &skill, Grade::Good, now.plus_minutes(10))?;
        assert_eq!(review.card.state, CardState::Review);
        assert_eq!(learner.db.reviews("local")?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_two_learners_share_store() -> Fallible<()> {
        let (_dir, path) = create_tmp_database()?;
        let mut phone = Learner::open(&path, "local", None)?;
        let mut laptop = Learner::open(&path, "local", None)?;
        let skill = SkillId::new("letter:lamed")?;
        let now = Timestamp::now();
        grade_skill(&mut phone, &skill, Grade::Good, now)?;
        let review = grade_skill(&mut laptop, &skill, Grade::Good, now.plus_minutes(10))?;
        assert_eq!(review.log.state, CardState::Learning);
        assert_eq!(review.card.reps, 2);
        assert_eq!(phone.card(&skill)?, Some(review.card));
        Ok(())
    }
}
