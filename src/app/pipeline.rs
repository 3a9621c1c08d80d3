//! Shared parameter handling used by every subcommand.
//!
//! flags or `--params FILE` -> validated `Parameters` -> optional `--save-params`

use log::{debug, info};

use crate::cli::ParamArgs;
use crate::domain::Parameters;
use crate::error::AppError;
use crate::io::{read_params_json, write_params_json};

/// Resolve the effective parameter set for a run.
pub fn resolve_params(args: &ParamArgs) -> Result<Parameters, AppError> {
    let p = match &args.params {
        Some(path) => {
            info!("loading parameters from {}", path.display());
            read_params_json(path)?
        }
        None => args.raw().validate()?,
    };
    debug!("effective parameters: {:?}", p.raw());

    if let Some(path) = &args.save_params {
        write_params_json(path, &p)?;
        info!("saved parameters to {}", path.display());
    }

    Ok(p)
}
