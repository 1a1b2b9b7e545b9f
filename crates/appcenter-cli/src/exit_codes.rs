//! Exit codes for the CLI

use appcenter::AppCenterError;

/// Success
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// The API answered with an unexpected status or body
pub const API_ERROR: i32 = 3;

/// Upload could not be completed
pub const UPLOAD_ERROR: i32 = 4;

/// The `appcenter` tool failed
pub const COMMAND_ERROR: i32 = 5;

/// Release processing did not finish in time
pub const TIMEOUT: i32 = 6;

/// Map an error to the process exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    let Some(err) = err.downcast_ref::<AppCenterError>() else {
        return ERROR;
    };

    match err {
        AppCenterError::Config(_)
        | AppCenterError::ConfigurationError(_)
        | AppCenterError::InvalidUrl(_) => CONFIG_ERROR,
        AppCenterError::UnexpectedStatus { .. }
        | AppCenterError::Decode { .. }
        | AppCenterError::ReleaseNotFound(_) => API_ERROR,
        AppCenterError::UploadFailed(_) | AppCenterError::FileRead { .. } => UPLOAD_ERROR,
        AppCenterError::CommandFailed { .. } => COMMAND_ERROR,
        AppCenterError::Timeout(_) => TIMEOUT,
        AppCenterError::Http(_) | AppCenterError::Serialize(_) => ERROR,
    }
}
