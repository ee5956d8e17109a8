//! WorldPop Fetcher Library
//!
//! A Rust library for browsing and downloading the WorldPop Global Project
//! population rasters. Keeps a local copy of the dataset catalog in sync with
//! the remote manifest and downloads the rasters of a country one at a time
//! over FTP or HTTP(S).

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        assert_eq!(MANIFEST_PATH, "assets/wpgpDatasets.csv");
        assert!(DEFAULT_REMOTE_URL.starts_with("ftp://"));
        assert!(USER_AGENT.contains("WPGP-Fetcher"));
    }

    #[test]
    fn test_error_types() {
        let input_error = errors::UserInputError::UnknownCountry {
            code: "ZZZ".to_string(),
        };
        let app_error = AppError::UserInput(input_error);

        assert_eq!(app_error.category(), "input");
        assert_eq!(app_error.exit_code(), 2);
        assert_eq!(app_error.to_string(), "ZZZ is not a valid ISO code");
        assert!(!app_error.requires_refresh());
    }
}
