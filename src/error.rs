//! # Errors
//!
//! Every scheduler failure is local: the call is rejected, nothing changes,
//! and the condition is logged where it happened. The error value is handed
//! back so callers that care can react; most ignore it.

use core::fmt;

/// Which fixed-capacity table a request targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Timeout,
    Cycle,
    Repeat,
    Parallel,
    Once,
}

impl Family {
    pub const fn name(self) -> &'static str {
        match self {
            Family::Timeout => "timeout",
            Family::Cycle => "cycle",
            Family::Repeat => "repeat",
            Family::Parallel => "parallel",
            Family::Once => "once",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The table had no free slot; the registration was dropped.
    CapacityExceeded { family: Family, limit: usize },
    /// A wait was requested while another one is still outstanding.
    ReentrantWait,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CapacityExceeded { family, limit } => {
                write!(f, "{} task overflow, limit {}", family, limit)
            }
            Error::ReentrantWait => write!(f, "wait cannot be nested"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_message_names_family_and_limit() {
        let err = Error::CapacityExceeded {
            family: Family::Cycle,
            limit: 16,
        };
        assert_eq!(format!("{}", err), "cycle task overflow, limit 16");
    }

    #[test]
    fn test_reentrant_message() {
        assert_eq!(format!("{}", Error::ReentrantWait), "wait cannot be nested");
    }
}
