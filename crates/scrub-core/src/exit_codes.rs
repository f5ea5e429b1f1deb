//! Exit codes for the projscrub CLI.
//!
//! Exit codes communicate the run outcome without requiring output parsing.
//!
//! Exit code ranges:
//! - 0-6: Operational outcomes
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)

/// Exit codes for projscrub operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Operational Outcomes (0-6)
    // ========================================================================
    /// Success
    Clean = 0,

    /// The user made no selection at a prompt; nothing was changed
    Cancelled = 6,

    // ========================================================================
    // User / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments
    ArgsError = 10,

    /// Interactive input required but unavailable
    EnvironmentUnavailable = 11,

    /// No project could be loaded
    NoActiveProject = 12,

    /// Export destination could not be created or already exists
    DestinationError = 13,

    /// Configuration file missing, unparseable or invalid
    ConfigError = 14,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O error
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Check if this exit code indicates an operational outcome (codes 0-6).
    pub fn is_operational(self) -> bool {
        (self as i32) < 10
    }

    /// Check if this exit code is a user/environment error (codes 10-19).
    pub fn is_user_error(self) -> bool {
        let code = self as i32;
        (10..20).contains(&code)
    }

    /// Check if this exit code is an internal error (codes 20-29).
    pub fn is_internal_error(self) -> bool {
        let code = self as i32;
        code >= 20
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::Cancelled => "OK_CANCELLED",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::EnvironmentUnavailable => "ERR_ENVIRONMENT",
            ExitCode::NoActiveProject => "ERR_NO_PROJECT",
            ExitCode::DestinationError => "ERR_DESTINATION",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values_are_stable() {
        assert_eq!(ExitCode::Clean.as_i32(), 0);
        assert_eq!(ExitCode::Cancelled.as_i32(), 6);
        assert_eq!(ExitCode::ArgsError.as_i32(), 10);
        assert_eq!(ExitCode::EnvironmentUnavailable.as_i32(), 11);
        assert_eq!(ExitCode::NoActiveProject.as_i32(), 12);
        assert_eq!(ExitCode::DestinationError.as_i32(), 13);
        assert_eq!(ExitCode::ConfigError.as_i32(), 14);
        assert_eq!(ExitCode::InternalError.as_i32(), 20);
        assert_eq!(ExitCode::IoError.as_i32(), 21);
    }

    #[test]
    fn test_ranges() {
        assert!(ExitCode::Cancelled.is_operational());
        assert!(!ExitCode::Cancelled.is_success());
        assert!(ExitCode::DestinationError.is_user_error());
        assert!(ExitCode::IoError.is_internal_error());
        assert_eq!(ExitCode::ConfigError.to_string(), "ERR_CONFIG (14)");
    }
}
