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

use std::path::Path;

use crate::config::Parameters;
use crate::db::Database;
use crate::error::Fallible;
use crate::error::fail;
use crate::scheduler::Scheduler;
use crate::types::card::Card;
use crate::types::skill_id::SkillId;

/// One learner's cards, together with the scheduler that grades them.
pub struct Learner {
    pub user_id: String,
    pub db: Database,
    pub scheduler: Scheduler,
}

impl Learner {
    pub fn open(db_path: &str, user_id: &str, config_path: Option<&Path>) -> Fallible<Self> {
        if user_id.trim().is_empty() {
            return fail("user id must not be empty.");
        }
        let params = Parameters::load(config_path)?;
        let scheduler = Scheduler::new(params)?;
        let db = Database::new(db_path)?;
        Ok(Self {
            user_id: user_id.to_string(),
            db,
            scheduler,
        })
    }

    pub fn card(&self, skill_id: &SkillId) -> Fallible<Option<Card>> {
        self.db.get_card(&self.user_id, skill_id)
    }

    /// Like [`Learner::card`], but a missing card is an error.
    pub fn existing_card(&self, skill_id: &SkillId) -> Fallible<Card> {
        match self.card(skill_id)? {
            Some(card) => Ok(card),
            None => fail(format!("no card for skill {skill_id}.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_database;

    #[test]
    fn test_empty_user() -> Fallible<()> {
        let (_dir, path) = create_tmp_database()?;
        assert!(Learner::open(&path, " ", None).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_config() -> Fallible<()> {
        let (dir, path) = create_tmp_database()?;
        let config = dir.path().join("nope.toml");
        assert!(Learner::open(&path, "local", Some(&config)).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_card() -> Fallible<()> {
        let (_dir, path) = create_tmp_database()?;
        let learner = Learner::open(&path, "local", None)?;
        let skill = SkillId::new("letter:he")?;
        assert!(learner.card(&skill)?.is_none());
        let err = learner.existing_card(&skill).err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("error: no card for skill letter:he."));
        Ok(())
    }
}
