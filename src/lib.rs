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

//! A spaced-repetition scheduler for Hebrew literacy skills: letters,
//! vowels, words, and prayer phrases.
//!
//! The core is [`scheduler::Scheduler`], a pure function from a card's
//! memory state and a grade to the card's next state, built on the FSRS
//! power-law forgetting curve in [`fsrs`]. The rest of the crate (a SQLite
//! store, TOML parameters, and a command line) drives it.

pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod fsrs;
pub mod learner;
pub mod scheduler;
pub mod types;

#[cfg(test)]
mod helper;

pub use config::Parameters;
pub use error::ErrorReport;
pub use error::Fallible;
pub use error::ScheduleError;
pub use fsrs::Grade;
pub use scheduler::Preview;
pub use scheduler::Scheduler;
pub use scheduler::due_skill_ids;
pub use scheduler::is_due;
pub use types::card::Card;
pub use types::card_state::CardState;
pub use types::review::Review;
pub use types::review::ReviewLog;
pub use types::skill_id::SkillId;
pub use types::timestamp::Timestamp;
