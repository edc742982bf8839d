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

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use serde::Serialize;

use crate::cmd::add::add_skills;
use crate::cmd::due::due_skills;
use crate::cmd::export::export_learner;
use crate::cmd::grade::grade_skill;
use crate::cmd::show::preview_skill;
use crate::cmd::show::show_skill;
use crate::cmd::stats::learner_stats;
use crate::error::Fallible;
use crate::fsrs::Grade;
use crate::learner::Learner;
use crate::types::skill_id::SkillId;
use crate::types::timestamp::Timestamp;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Create cards for skills the learner has not seen yet.
    Add {
        #[command(flatten)]
        store: StoreArgs,
        /// Skill identifiers, e.g. `letter:alef`.
        #[arg(required = true)]
        skills: Vec<SkillId>,
        #[command(flatten)]
        time: TimeArgs,
    },
    /// Grade a review of one skill.
    Grade {
        #[command(flatten)]
        store: StoreArgs,
        skill: SkillId,
        /// One of again, hard, good, easy (or 1-4).
        grade: Grade,
        #[command(flatten)]
        time: TimeArgs,
    },
    /// List the skills due for review, most overdue first.
    Due {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        time: TimeArgs,
    },
    /// Print a skill's card.
    Show {
        #[command(flatten)]
        store: StoreArgs,
        skill: SkillId,
        #[command(flatten)]
        time: TimeArgs,
    },
    /// Print what each grade would do to a skill's card.
    Preview {
        #[command(flatten)]
        store: StoreArgs,
        skill: SkillId,
        #[command(flatten)]
        time: TimeArgs,
    },
    /// Export all cards and reviews as JSON.
    Export {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Print card counts.
    Stats {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        time: TimeArgs,
    },
}

#[derive(Args)]
struct StoreArgs {
    /// Path to the review database.
    #[arg(long, default_value = "alefbet.db")]
    db: PathBuf,
    /// The learner whose cards to use.
    #[arg(long, default_value = "local")]
    user: String,
    /// Optional path to a TOML file of scheduler parameters.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl StoreArgs {
    fn open(&self) -> Fallible<Learner> {
        let db_path = self.db.display().to_string();
        Learner::open(&db_path, &self.user, self.config.as_deref())
    }
}

#[derive(Args)]
struct TimeArgs {
    /// Evaluate at this RFC 3339 timestamp instead of the current time.
    #[arg(long)]
    at: Option<Timestamp>,
}

impl TimeArgs {
    fn now(&self) -> Timestamp {
        self.at.unwrap_or_else(Timestamp::now)
    }
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Add {
            store,
            skills,
            time,
        } => {
            let mut learner = store.open()?;
            let added = add_skills(&mut learner, &skills, time.now())?;
            println!("Added {added} cards.");
            Ok(())
        }
        Command::Grade {
            store,
            skill,
            grade,
            time,
        } => {
            let mut learner = store.open()?;
            let review = grade_skill(&mut learner, &skill, grade, time.now())?;
            print_json(&review)
        }
        Command::Due { store, time } => {
            let learner = store.open()?;
            for skill_id in due_skills(&learner, time.now())? {
                println!("{skill_id}");
            }
            Ok(())
        }
        Command::Show { store, skill, time } => {
            let learner = store.open()?;
            print_json(&show_skill(&learner, &skill, time.now())?)
        }
        Command::Preview { store, skill, time } => {
            let learner = store.open()?;
            print_json(&preview_skill(&learner, &skill, time.now())?)
        }
        Command::Export { store } => {
            let learner = store.open()?;
            print_json(&export_learner(&learner)?)
        }
        Command::Stats { store, time } => {
            let learner = store.open()?;
            print_json(&learner_stats(&learner, time.now())?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Fallible<()> {
    let json: String = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_definition() {
        Command::command().debug_assert();
    }

    #[test]
    fn test_parse_grade() {
        let cli = Command::try_parse_from([
            "alefbet",
            "grade",
            "letter:alef",
            "good",
            "--at",
            "2025-01-01T00:00:00Z",
        ]);
        match cli {
            Ok(Command::Grade {
                skill, grade, time, ..
            }) => {
                assert_eq!(skill.as_str(), "letter:alef");
                assert_eq!(grade, Grade::Good);
                assert!(time.at.is_some());
            }
            _ => panic!("expected a grade command"),
        }
    }

    #[test]
    fn test_parse_add_at() -> Fallible<()> {
        let cli = Command::try_parse_from([
            "alefbet",
            "add",
            "letter:alef",
            "letter:bet",
            "--at",
            "2025-01-01T00:00:00Z",
        ]);
        match cli {
            Ok(Command::Add { skills, time, .. }) => {
                assert_eq!(skills.len(), 2);
                assert_eq!(time.now(), Timestamp::parse_rfc3339("2025-01-01T00:00:00Z")?);
            }
            _ => panic!("expected an add command"),
        }
        Ok(())
    }

    #[test]
    fn test_reject_invalid_grade() {
        let cli = Command::try_parse_from(["alefbet", "grade", "letter:alef", "perfect"]);
        assert!(cli.is_err());
    }
}
