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

//! The FSRS memory model: a power-law forgetting curve plus the update rules
//! for stability and difficulty.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ScheduleError;

/// Retrievability: probability of recall, in `[0, 1]`.
pub type R = f64;

/// Stability: days until retrievability falls to 90%.
pub type Stability = f64;

/// Difficulty: a value in `[1, 10]`.
pub type Difficulty = f64;

/// Time, in days.
pub type T = f64;

pub type Weights = [f64; 19];

/// FSRS-5 default weights.
pub const DEFAULT_WEIGHTS: Weights = [
    0.40255, 1.18385, 3.173, 15.69105, 7.1949, 0.5345, 1.4604, 0.0046, 1.54575, 0.1192, 1.01925,
    1.9395, 0.11, 0.29605, 2.2698, 0.2315, 2.9898, 0.51655, 0.6621,
];

const F: f64 = 19.0 / 81.0;

const C: f64 = -0.5;

pub const MIN_DIFFICULTY: Difficulty = 1.0;

pub const MAX_DIFFICULTY: Difficulty = 10.0;

/// Stability never drops below this, whatever the review history.
pub const MIN_STABILITY: Stability = 0.01;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Again => "again",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Grade::Again => 1,
            Grade::Hard => 2,
            Grade::Good => 3,
            Grade::Easy => 4,
        }
    }
}

impl From<Grade> for f64 {
    fn from(g: Grade) -> f64 {
        g.code() as f64
    }
}

impl TryFrom<u8> for Grade {
    type Error = ScheduleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Grade::Again),
            2 => Ok(Grade::Hard),
            3 => Ok(Grade::Good),
            4 => Ok(Grade::Easy),
            _ => Err(ScheduleError::InvalidGrade(value.to_string())),
        }
    }
}

impl FromStr for Grade {
    type Err = ScheduleError;

    /// Accepts either the name (`good`) or the numeric code (`3`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" | "1" => Ok(Grade::Again),
            "hard" | "2" => Ok(Grade::Hard),
            "good" | "3" => Ok(Grade::Good),
            "easy" | "4" => Ok(Grade::Easy),
            _ => Err(ScheduleError::InvalidGrade(s.to_string())),
        }
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for Grade {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Grade {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        string
            .parse::<Grade>()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// The forgetting curve. `R(S, S) = 0.9`.
pub fn retrievability(t: T, s: Stability) -> R {
    (1.0 + F * (t / s)).powf(C)
}

/// The forgetting curve solved for `t`: the number of days until
/// retrievability decays to `r`.
pub fn interval(r: R, s: Stability) -> T {
    (s / F) * (r.powf(1.0 / C) - 1.0)
}

pub fn initial_stability(w: &Weights, g: Grade) -> Stability {
    match g {
        Grade::Again => w[0],
        Grade::Hard => w[1],
        Grade::Good => w[2],
        Grade::Easy => w[3],
    }
    .max(MIN_STABILITY)
}

pub fn initial_difficulty(w: &Weights, g: Grade) -> Difficulty {
    clamp_d(raw_initial_difficulty(w, g))
}

fn raw_initial_difficulty(w: &Weights, g: Grade) -> Difficulty {
    let g: f64 = g.into();
    w[4] - f64::exp(w[5] * (g - 1.0)) + 1.0
}

fn clamp_d(d: Difficulty) -> Difficulty {
    d.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Stability after a review spaced at least a day from the previous one.
pub fn new_stability(w: &Weights, d: Difficulty, s: Stability, r: R, g: Grade) -> Stability {
    let s = if g == Grade::Again {
        s_fail(w, d, s, r)
    } else {
        s_success(w, d, s, r, g)
    };
    s.max(MIN_STABILITY)
}

fn s_success(w: &Weights, d: Difficulty, s: Stability, r: R, g: Grade) -> Stability {
    let t_d = 11.0 - d;
    let t_s = s.powf(-w[9]);
    let t_r = f64::exp(w[10] * (1.0 - r)) - 1.0;
    let h = if g == Grade::Hard { w[15] } else { 1.0 };
    let b = if g == Grade::Easy { w[16] } else { 1.0 };
    let c = f64::exp(w[8]);
    let alpha = 1.0 + t_d * t_s * t_r * h * b * c;
    s * alpha
}

fn s_fail(w: &Weights, d: Difficulty, s: Stability, r: R) -> Stability {
    let d_f = d.powf(-w[12]);
    let s_f = (s + 1.0).powf(w[13]) - 1.0;
    let r_f = f64::exp(w[14] * (1.0 - r));
    let c_f = w[11];
    let long_term = d_f * s_f * r_f * c_f;
    // A lapse must cost at least as much as a same-day Again would.
    let ceiling = s / f64::exp(w[17] * w[18]);
    f64::min(long_term, ceiling)
}

/// Stability after a review on the same day as the previous one.
pub fn short_term_stability(w: &Weights, s: Stability, g: Grade) -> Stability {
    let g: f64 = g.into();
    let sinc = f64::exp(w[17] * (g - 3.0 + w[18]));
    let sinc = if g >= 3.0 { sinc.max(1.0) } else { sinc };
    (s * sinc).max(MIN_STABILITY)
}

fn delta_d(w: &Weights, g: Grade) -> f64 {
    let g: f64 = g.into();
    -w[6] * (g - 3.0)
}

fn dp(w: &Weights, d: Difficulty, g: Grade) -> f64 {
    d + delta_d(w, g) * ((10.0 - d) / 9.0)
}

/// Difficulty after a review. Mean-reverts toward the initial Easy
/// difficulty.
pub fn new_difficulty(w: &Weights, d: Difficulty, g: Grade) -> Difficulty {
    clamp_d(w[7] * raw_initial_difficulty(w, Grade::Easy) + (1.0 - w[7]) * dp(w, d, g))
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: &Weights = &DEFAULT_WEIGHTS;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_retrievability_at_zero() {
        assert!(approx(retrievability(0.0, 1.0), 1.0));
        assert!(approx(retrievability(0.0, 300.0), 1.0));
    }

    #[test]
    fn test_retrievability_at_stability() {
        for s in [0.5, 1.0, 3.173, 20.0, 1000.0] {
            assert!(approx(retrievability(s, s), 0.9));
        }
    }

    #[test]
    fn test_retrievability_shape() {
        // Decreasing in t.
        assert!(retrievability(1.0, 10.0) > retrievability(2.0, 10.0));
        // Increasing in S.
        assert!(retrievability(5.0, 10.0) < retrievability(5.0, 20.0));
        // Tends to zero.
        assert!(retrievability(1e12, 1.0) < 1e-5);
    }

    #[test]
    fn test_power_law_tail() {
        // An exponential curve with the same 90% point would be at 0.9^10
        // after ten stabilities. The power law decays slower than that.
        let s = 10.0;
        let exponential = 0.9f64.powi(10);
        assert!(retrievability(10.0 * s, s) > exponential);
    }

    #[test]
    fn test_interval_inverts_retrievability() {
        let s = 5.0;
        assert!(approx(interval(0.9, s), s));
        for r in [0.7, 0.8, 0.95] {
            let t = interval(r, s);
            assert!(approx(retrievability(t, s), r));
        }
    }

    #[test]
    fn test_initial_values() {
        assert!(approx(initial_stability(W, Grade::Good), 3.173));
        assert!(approx(initial_stability(W, Grade::Easy), 15.69105));
        let d_again = initial_difficulty(W, Grade::Again);
        let d_easy = initial_difficulty(W, Grade::Easy);
        assert!(d_again > d_easy);
        assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&d_again));
        assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&d_easy));
    }

    #[test]
    fn test_stability_increases_on_good() {
        let d = 5.0;
        let s = 3.0;
        let r = retrievability(s, s);
        assert!(new_stability(W, d, s, r, Grade::Good) > s);
    }

    #[test]
    fn test_grade_ordering_of_gain() {
        let d = 5.0;
        let s = 10.0;
        let r = retrievability(s, s);
        let hard = new_stability(W, d, s, r, Grade::Hard);
        let good = new_stability(W, d, s, r, Grade::Good);
        let easy = new_stability(W, d, s, r, Grade::Easy);
        assert!(hard < good);
        assert!(good < easy);
    }

    #[test]
    fn test_harder_items_gain_less() {
        let s = 10.0;
        let r = retrievability(s, s);
        let easy_item = new_stability(W, 2.0, s, r, Grade::Good);
        let hard_item = new_stability(W, 9.0, s, r, Grade::Good);
        assert!(hard_item < easy_item);
    }

    #[test]
    fn test_stability_decreases_on_again() {
        let d = 5.0;
        for s in [0.5, 3.0, 20.0, 400.0] {
            for t in [1.0, s, 10.0 * s] {
                let r = retrievability(t, s);
                let next = new_stability(W, d, s, r, Grade::Again);
                assert!(next < s);
                assert!(next >= MIN_STABILITY);
            }
        }
    }

    #[test]
    fn test_short_term_stability() {
        let s = 4.0;
        assert!(short_term_stability(W, s, Grade::Again) < s);
        assert!(short_term_stability(W, s, Grade::Good) >= s);
        assert!(short_term_stability(W, s, Grade::Easy) > short_term_stability(W, s, Grade::Good));
    }

    #[test]
    fn test_difficulty_direction() {
        let d = 5.0;
        assert!(new_difficulty(W, d, Grade::Again) > d);
        assert!(new_difficulty(W, d, Grade::Hard) > d);
        assert!(new_difficulty(W, d, Grade::Easy) < d);
        assert!((new_difficulty(W, d, Grade::Good) - d).abs() < 0.01);
    }

    #[test]
    fn test_difficulty_clamped() {
        let mut d = initial_difficulty(W, Grade::Again);
        for _ in 0..100 {
            d = new_difficulty(W, d, Grade::Again);
        }
        assert!(d <= MAX_DIFFICULTY);
        let mut d = initial_difficulty(W, Grade::Easy);
        for _ in 0..100 {
            d = new_difficulty(W, d, Grade::Easy);
        }
        assert!(d >= MIN_DIFFICULTY);
    }

    #[test]
    fn test_grade_parsing() {
        assert_eq!("good".parse::<Grade>(), Ok(Grade::Good));
        assert_eq!("Again".parse::<Grade>(), Ok(Grade::Again));
        assert_eq!("4".parse::<Grade>(), Ok(Grade::Easy));
        assert_eq!(Grade::try_from(2u8), Ok(Grade::Hard));
        assert_eq!(
            Grade::try_from(0u8),
            Err(ScheduleError::InvalidGrade("0".to_string()))
        );
        assert!("forgot".parse::<Grade>().is_err());
    }
}
