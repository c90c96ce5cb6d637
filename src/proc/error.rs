use core::fmt;

/// Argument and resource-exhaustion failures the process-table core can
/// return. Programmer errors (broken invariants) are not represented here —
/// those are fatal `panic!`s, per the design's three error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcError {
    /// No free process slot, or the kernel-stack pool is exhausted.
    ResourceExhausted,
    /// No slot matches the given pid.
    NotFound,
    /// `change_queue` given a level outside `{1, 2, 3}`.
    InvalidLevel,
    /// `wait` called by a process with no children.
    NoChildren,
    /// `wait` returned early because the caller was marked `killed`.
    Killed,
    /// A call outside this core's scope (file-system tuning surface).
    Unsupported,
}

impl fmt::Display for ProcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProcError::ResourceExhausted => write!(f, "no free process slot or kernel stack"),
            ProcError::NotFound => write!(f, "no such pid"),
            ProcError::InvalidLevel => write!(f, "queue level out of range"),
            ProcError::NoChildren => write!(f, "no children to wait for"),
            ProcError::Killed => write!(f, "process was killed while waiting"),
            ProcError::Unsupported => write!(f, "unsupported outside this core"),
        }
    }
}

pub type ProcResult<T> = Result<T, ProcError>;
