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

use tempfile::TempDir;
use tempfile::tempdir;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// A database path inside a fresh temporary directory. The directory is
/// deleted when the returned guard is dropped.
pub fn create_tmp_database() -> Fallible<(TempDir, String)> {
    let dir: TempDir = tempdir()?;
    let path: String = dir
        .path()
        .join("alefbet.db")
        .to_str()
        .ok_or_else(|| ErrorReport::new("invalid path"))?
        .to_string();
    Ok((dir, path))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_create_tmp_database() -> Fallible<()> {
        let (dir, path) = create_tmp_database()?;
        assert!(dir.path().exists());
        assert!(!Path::new(&path).exists());
        Ok(())
    }
}
