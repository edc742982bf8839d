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
use crate::types::card::Card;
use crate::types::review::ReviewLog;
use crate::types::skill_id::SkillId;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Export {
    user_id: String,
    cards: Vec<CardExport>,
    reviews: Vec<ReviewExport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CardExport {
    skill_id: SkillId,
    #[serde(flatten)]
    card: Card,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewExport {
    skill_id: SkillId,
    #[serde(flatten)]
    log: ReviewLog,
    interval_days: f64,
}

pub fn export_learner(learner: &Learner) -> Fallible<Export> {
    let cards: Vec<CardExport> = learner
        .db
        .cards(&learner.user_id)?
        .into_iter()
        .map(|(skill_id, card)| CardExport { skill_id, card })
        .collect();
    let reviews: Vec<ReviewExport> = learner
        .db
        .reviews(&learner.user_id)?
        .into_iter()
        .map(|(skill_id, log)| ReviewExport {
            skill_id,
            interval_days: log.interval_days(),
            log,
        })
        .collect();
    Ok(Export {
        user_id: learner.user_id.clone(),
        cards,
        reviews,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::grade::grade_skill;
    use crate::fsrs::Grade;
    use crate::helper::create_tmp_database;
    use crate::types::timestamp::Timestamp;

    #[test]
    fn test_export() -> Fallible<()> {
        let (_dir, path) = create_tmp_database()?;
        let mut learner = Learner::open(&path, "dana", None)?;
        let skill = SkillId::new("prayer:shema")?;
        let now = Timestamp::parse_rfc3339("2025-04-01T07:00:00Z")?;
        grade_skill(&mut learner, &skill, Grade::Easy, now)?;
        let export = export_learner(&learner)?;
        let json = serde_json::to_value(&export)?;
        assert_eq!(json["userId"], "dana");
        assert_eq!(json["cards"][0]["skillId"], "prayer:shema");
        assert_eq!(json["cards"][0]["state"], "review");
        assert_eq!(json["reviews"][0]["grade"], "easy");
        assert_eq!(json["reviews"][0]["state"], "new");
        assert_eq!(json["reviews"][0]["intervalDays"], 16.0);
        Ok(())
    }
}
