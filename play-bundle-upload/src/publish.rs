// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Publishing inputs and results.

use {
    crate::Result,
    std::path::{Path, PathBuf},
    thiserror::Error,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputFileKind {
    ServiceAccountKey,
    AppBundle,
}

impl std::fmt::Display for InputFileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::ServiceAccountKey => "key",
            Self::AppBundle => "aab",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Error)]
#[error("{kind} file does not exist: {}", path.display())]
pub struct MissingInputFile {
    pub kind: InputFileKind,
    pub path: PathBuf,
}

fn require_file(kind: InputFileKind, path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(MissingInputFile {
            kind,
            path: path.to_path_buf(),
        }
        .into())
    }
}

/// What Google accepted.
#[derive(Clone, Debug)]
pub struct PublishOutcome {
    pub edit_id: String,
    pub version_code: i64,
    pub sha256: String,
}

/// Check that the service account key and the app bundle exist.
///
/// The key is checked first. Nothing should be sent to Google before this passes.
pub fn check_inputs(key_path: &Path, aab_path: &Path) -> Result<()> {
    require_file(InputFileKind::ServiceAccountKey, key_path)?;
    require_file(InputFileKind::AppBundle, aab_path)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_file_message() {
        let err = MissingInputFile {
            kind: InputFileKind::AppBundle,
            path: PathBuf::from("build/app-release.aab"),
        };

        assert_eq!(
            err.to_string(),
            "aab file does not exist: build/app-release.aab"
        );
    }

    #[test]
    fn key_checked_before_bundle() {
        let err =
            check_inputs(Path::new("no-such-key.json"), Path::new("no-such.aab")).unwrap_err();

        let missing = err.downcast_ref::<MissingInputFile>().unwrap();
        assert_eq!(missing.kind, InputFileKind::ServiceAccountKey);
    }
}
