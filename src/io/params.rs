//! Read/write parameter files.
//!
//! A parameter file is a JSON object with the nine lowercase fields:
//!
//! ```json
//! { "wp": 80, "wc": 100, "sp": 400, "sc": 400, "np": 200, "nc": 200, "kp": 1, "kc": 1, "l": 64 }
//! ```
//!
//! Files are validated on load; a file with e.g. `"l": 0` is rejected.

use std::fs::File;
use std::path::Path;

use crate::domain::{Parameters, RawParameters};
use crate::error::AppError;

pub fn read_params_json(path: &Path) -> Result<Parameters, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open parameter file '{}': {e}", path.display())))?;
    let raw: RawParameters = serde_json::from_reader(file).map_err(|e| {
        AppError::new(2, format!("Invalid parameter file '{}': {e}", path.display()))
    })?;
    Ok(raw.validate()?)
}

pub fn write_params_json(path: &Path, p: &Parameters) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create parameter file '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, p)
        .map_err(|e| AppError::new(4, format!("Failed to write parameter file: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_params as params;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let p = params(80.0, 100.0, 400.0, 400.0, 200.0, 200.0, 1.0, 1.0, 64.0);
        write_params_json(&path, &p).unwrap();
        assert_eq!(read_params_json(&path).unwrap(), p);
    }

    #[test]
    fn invalid_file_contents() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("zero_l.json");
        std::fs::write(
            &path,
            r#"{"wp":1,"wc":1,"sp":0,"sc":0,"np":0,"nc":0,"kp":1,"kc":1,"l":0}"#,
        )
        .unwrap();
        assert_eq!(read_params_json(&path).unwrap_err().exit_code(), 3);

        let path = dir.path().join("missing.json");
        std::fs::write(&path, r#"{"wp":1}"#).unwrap();
        assert_eq!(read_params_json(&path).unwrap_err().exit_code(), 2);

        assert!(read_params_json(&dir.path().join("nope.json")).is_err());
    }
}
