pub mod role;
pub mod user;

/// Result of a delete attempt against the primary store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Absent, or already in the state the delete would produce.
    NotFound,
    /// `can_deleted` is false.
    Protected,
}
