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

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::fsrs::DEFAULT_WEIGHTS;
use crate::fsrs::Weights;

/// Scheduler parameters. Every field may be omitted from the TOML file.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// The recall probability intervals are computed for.
    pub target_retention: f64,
    /// The shortest review interval, in days.
    pub min_interval: u32,
    /// The longest review interval, in days.
    pub max_interval: u32,
    /// Learning steps, in minutes.
    pub learning_steps: Vec<u32>,
    /// Relearning steps, in minutes.
    pub relearning_steps: Vec<u32>,
    pub weights: Vec<f64>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            target_retention: 0.9,
            min_interval: 1,
            max_interval: 36500,
            learning_steps: vec![1, 10],
            relearning_steps: vec![10],
            weights: DEFAULT_WEIGHTS.to_vec(),
        }
    }
}

impl Parameters {
    pub fn from_toml(source: &str) -> Fallible<Self> {
        let params: Parameters = toml::from_str(source)?;
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a file, or the defaults if no path is given.
    pub fn load(path: Option<&Path>) -> Fallible<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return fail(format!("config file does not exist: {}", path.display()));
                }
                log::debug!("Loading parameters from {}", path.display());
                Self::from_toml(&read_to_string(path)?)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Fallible<()> {
        let r = self.target_retention;
        if !(r > 0.0 && r < 1.0) {
            return fail(format!("target_retention must be in (0, 1), got {r}"));
        }
        if self.min_interval < 1 {
            return fail("min_interval must be at least one day.");
        }
        if self.min_interval > self.max_interval {
            return fail(format!(
                "min_interval ({}) exceeds max_interval ({})",
                self.min_interval, self.max_interval
            ));
        }
        if self.learning_steps.contains(&0) || self.relearning_steps.contains(&0) {
            return fail("learning and relearning steps must be positive.");
        }
        self.weights()?;
        Ok(())
    }

    pub fn weights(&self) -> Fallible<Weights> {
        let weights: Weights = match self.weights.as_slice().try_into() {
            Ok(w) => w,
            Err(_) => {
                return fail(format!(
                    "expected 19 weights, got {}",
                    self.weights.len()
                ));
            }
        };
        if weights.iter().any(|w| !w.is_finite()) {
            return fail("weights must be finite.");
        }
        Ok(weights)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_defaults() -> Fallible<()> {
        let params = Parameters::from_toml("")?;
        assert_eq!(params, Parameters::default());
        assert_eq!(params.weights()?, DEFAULT_WEIGHTS);
        Ok(())
    }

    #[test]
    fn test_partial() -> Fallible<()> {
        let params = Parameters::from_toml("target_retention = 0.85\nlearning_steps = [5]\n")?;
        assert_eq!(params.target_retention, 0.85);
        assert_eq!(params.learning_steps, vec![5]);
        assert_eq!(params.relearning_steps, vec![10]);
        assert_eq!(params.max_interval, 36500);
        Ok(())
    }

    #[test]
    fn test_invalid_retention() {
        assert!(Parameters::from_toml("target_retention = 1.0").is_err());
        assert!(Parameters::from_toml("target_retention = 0.0").is_err());
    }

    #[test]
    fn test_invalid_intervals() {
        assert!(Parameters::from_toml("min_interval = 0").is_err());
        assert!(Parameters::from_toml("min_interval = 10\nmax_interval = 5").is_err());
    }

    #[test]
    fn test_invalid_steps() {
        assert!(Parameters::from_toml("learning_steps = [1, 0]").is_err());
    }

    #[test]
    fn test_wrong_weight_count() {
        assert!(Parameters::from_toml("weights = [1.0, 2.0]").is_err());
    }

    #[test]
    fn test_unknown_key() {
        assert!(Parameters::from_toml("enable_fuzz = true").is_err());
    }

    #[test]
    fn test_load() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("scheduler.toml");
        write(&path, "max_interval = 365\n")?;
        let params = Parameters::load(Some(&path))?;
        assert_eq!(params.max_interval, 365);
        assert!(Parameters::load(Some(&dir.path().join("missing.toml"))).is_err());
        assert_eq!(Parameters::load(None)?, Parameters::default());
        Ok(())
    }
}
