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

use std::collections::BTreeMap;

use rusqlite::Connection;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::TransactionBehavior;
use rusqlite::config::DbConfig;

use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::review::Review;
use crate::types::review::ReviewLog;
use crate::types::skill_id::SkillId;

/// The local review-state store. Cards are keyed by `(user_id, skill_id)`.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        log::debug!("Opening database at {database_path}");
        Self::setup(Connection::open(database_path)?)
    }

    pub fn in_memory() -> Fallible<Self> {
        Self::setup(Connection::open_in_memory()?)
    }

    fn setup(mut conn: Connection) -> Fallible<Self> {
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !schema_exists(&tx)? {
                log::debug!("Creating schema");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self { conn })
    }

    /// Get a card. Returns `None` if the user has no card for the skill.
    pub fn get_card(&self, user_id: &str, skill_id: &SkillId) -> Fallible<Option<Card>> {
        select_card(&self.conn, user_id, skill_id)
    }

    /// All of a user's cards.
    pub fn cards(&self, user_id: &str) -> Fallible<BTreeMap<SkillId, Card>> {
        let sql = "select skill_id, state, step, stability, difficulty, due, last_review, elapsed_days, reps, lapses from cards where user_id = ?;";
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([user_id])?;
        let mut cards = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let skill_id: SkillId = row.get(0)?;
            cards.insert(skill_id, read_card(row, 1)?);
        }
        Ok(cards)
    }

    /// Insert a card, or overwrite the stored one.
    pub fn save_card(&mut self, user_id: &str, skill_id: &SkillId, card: &Card) -> Fallible<()> {
        let tx = self.conn.transaction()?;
        upsert_card(&tx, user_id, skill_id, card)?;
        tx.commit()?;
        Ok(())
    }

    /// Read a card, grade it, and store the new state and the log entry, all
    /// under one write lock. `grade` receives `None` if the user has no card
    /// for the skill yet. Nothing is written if `grade` fails.
    pub fn review_card<F>(
        &mut self,
        user_id: &str,
        skill_id: &SkillId,
        grade: F,
    ) -> Fallible<Review>
    where
        F: FnOnce(Option<Card>) -> Fallible<Review>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let card = select_card(&tx, user_id, skill_id)?;
        let review = grade(card)?;
        upsert_card(&tx, user_id, skill_id, &review.card)?;
        insert_review(&tx, user_id, skill_id, &review.log)?;
        tx.commit()?;
        log::debug!("Recorded review of {skill_id} for {user_id}");
        Ok(review)
    }

    /// A user's review log, oldest first.
    pub fn reviews(&self, user_id: &str) -> Fallible<Vec<(SkillId, ReviewLog)>> {
        let sql = "select skill_id, reviewed_at, grade, state, elapsed_days, stability, difficulty, due from reviews where user_id = ? order by reviewed_at, review_id;";
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([user_id])?;
        let mut reviews = Vec::new();
        while let Some(row) = rows.next()? {
            let skill_id: SkillId = row.get(0)?;
            let log = ReviewLog {
                reviewed_at: row.get(1)?,
                grade: row.get(2)?,
                state: row.get(3)?,
                elapsed_days: row.get(4)?,
                stability: row.get(5)?,
                difficulty: row.get(6)?,
                due: row.get(7)?,
            };
            reviews.push((skill_id, log));
        }
        Ok(reviews)
    }
}

fn select_card(conn: &Connection, user_id: &str, skill_id: &SkillId) -> Fallible<Option<Card>> {
    let sql = "select state, step, stability, difficulty, due, last_review, elapsed_days, reps, lapses from cards where user_id = ? and skill_id = ?;";
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query((user_id, skill_id))?;
    match rows.next()? {
        Some(row) => Ok(Some(read_card(row, 0)?)),
        None => Ok(None),
    }
}

/// Read the card columns starting at `offset`.
fn read_card(row: &Row, offset: usize) -> rusqlite::Result<Card> {
    Ok(Card {
        state: row.get(offset)?,
        step: row.get(offset + 1)?,
        stability: row.get(offset + 2)?,
        difficulty: row.get(offset + 3)?,
        due: row.get(offset + 4)?,
        last_review: row.get(offset + 5)?,
        elapsed_days: row.get(offset + 6)?,
        reps: row.get(offset + 7)?,
        lapses: row.get(offset + 8)?,
    })
}

fn upsert_card(tx: &Transaction, user_id: &str, skill_id: &SkillId, card: &Card) -> Fallible<()> {
    let sql = "insert into cards (user_id, skill_id, state, step, stability, difficulty, due, last_review, elapsed_days, reps, lapses) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) on conflict (user_id, skill_id) do update set state = excluded.state, step = excluded.step, stability = excluded.stability, difficulty = excluded.difficulty, due = excluded.due, last_review = excluded.last_review, elapsed_days = excluded.elapsed_days, reps = excluded.reps, lapses = excluded.lapses;";
    tx.execute(
        sql,
        (
            user_id,
            skill_id,
            card.state,
            card.step,
            card.stability,
            card.difficulty,
            card.due,
            card.last_review,
            card.elapsed_days,
            card.reps,
            card.lapses,
        ),
    )?;
    Ok(())
}

type ReviewId = i64;

fn insert_review(
    tx: &Transaction,
    user_id: &str,
    skill_id: &SkillId,
    log: &ReviewLog,
) -> Fallible<ReviewId> {
    let sql = "insert into reviews (user_id, skill_id, reviewed_at, grade, state, elapsed_days, stability, difficulty, due) values (?, ?, ?, ?, ?, ?, ?, ?, ?) returning review_id;";
    let review_id: ReviewId = tx.query_row(
        sql,
        (
            user_id,
            skill_id,
            log.reviewed_at,
            log.grade,
            log.state,
            log.elapsed_days,
            log.stability,
            log.difficulty,
            log.due,
        ),
        |row| row.get(0),
    )?;
    Ok(review_id)
}

fn schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::fail;
    use crate::fsrs::Grade;
    use crate::helper::create_tmp_database;
    use crate::scheduler::Scheduler;
    use crate::types::card_state::CardState;
    use crate::types::timestamp::Timestamp;

    fn t0() -> Fallible<Timestamp> {
        Timestamp::parse_rfc3339("2025-02-10T18:45:12.123456789Z")
    }

    #[test]
    fn test_missing_card() -> Fallible<()> {
        let db = Database::in_memory()?;
        assert_eq!(db.get_card("local", &SkillId::new("letter:alef")?)?, None);
        assert!(db.cards("local")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_card_round_trip() -> Fallible<()> {
        let s = Scheduler::default();
        let mut db = Database::in_memory()?;
        let skill = SkillId::new("letter:alef")?;
        let now = t0()?;
        let card = s.grade_card(&s.create_card(now), Grade::Good, now)?;
        let card = s.grade_card(&card, Grade::Hard, now.plus_minutes(7))?;
        db.save_card("local", &skill, &card)?;
        assert_eq!(db.get_card("local", &skill)?, Some(card));
        Ok(())
    }

    #[test]
    fn test_users_are_separate() -> Fallible<()> {
        let s = Scheduler::default();
        let mut db = Database::in_memory()?;
        let skill = SkillId::new("word:shalom")?;
        db.save_card("dana", &skill, &s.create_card(t0()?))?;
        assert!(db.get_card("yoni", &skill)?.is_none());
        assert_eq!(db.cards("dana")?.len(), 1);
        assert!(db.cards("yoni")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_review_card() -> Fallible<()> {
        let s = Scheduler::default();
        let mut db = Database::in_memory()?;
        let skill = SkillId::new("vowel:segol")?;
        let now = t0()?;
        db.save_card("local", &skill, &s.create_card(now))?;
        let review = db.review_card("local", &skill, |card| match card {
            Some(card) => Ok(s.review(&card, Grade::Easy, now)?),
            None => fail("card should exist"),
        })?;
        let stored = db.get_card("local", &skill)?;
        assert_eq!(stored.map(|c| c.state), Some(CardState::Review));
        let reviews = db.reviews("local")?;
        assert_eq!(reviews, vec![(skill, review.log)]);
        Ok(())
    }

    #[test]
    fn test_failed_review_writes_nothing() -> Fallible<()> {
        let s = Scheduler::default();
        let mut db = Database::in_memory()?;
        let skill = SkillId::new("word:ima")?;
        let card = s.create_card(t0()?);
        db.save_card("local", &skill, &card)?;
        let result = db.review_card("local", &skill, |_| fail("rejected"));
        assert!(result.is_err());
        assert_eq!(db.get_card("local", &skill)?, Some(card));
        assert!(db.reviews("local")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_review_sees_other_handle_writes() -> Fallible<()> {
        let (_dir, path) = create_tmp_database()?;
        let s = Scheduler::default();
        let skill = SkillId::new("word:aba")?;
        let mut first = Database::new(&path)?;
        let mut second = Database::new(&path)?;
        let now = t0()?;
        let grade = |card: Option<Card>, at: Timestamp| -> Fallible<Review> {
            let card = card.unwrap_or_else(|| s.create_card(at));
            Ok(s.review(&card, Grade::Good, at)?)
        };
        first.review_card("local", &skill, |card| grade(card, now))?;
        let later = now.plus_minutes(10);
        let review = second.review_card("local", &skill, |card| grade(card, later))?;
        // The second handle graded the card the first one stored.
        assert_eq!(review.log.state, CardState::Learning);
        assert_eq!(review.card.reps, 2);
        assert_eq!(first.reviews("local")?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_reopen() -> Fallible<()> {
        let (_dir, path) = create_tmp_database()?;
        let s = Scheduler::default();
        let skill = SkillId::new("prayer:modeh-ani")?;
        let card = s.create_card(t0()?);
        {
            let mut db = Database::new(&path)?;
            db.save_card("local", &skill, &card)?;
        }
        let db = Database::new(&path)?;
        assert_eq!(db.get_card("local", &skill)?, Some(card));
        Ok(())
    }
}
