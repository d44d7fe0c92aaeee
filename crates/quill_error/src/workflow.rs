//! Workflow engine error types.

/// Workflow engine error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum WorkflowErrorKind {
    /// The engine's transition counter exceeded its ceiling
    #[display("Step budget of {} exceeded (last node: {})", limit, last_node)]
    StepBudgetExceeded {
        /// Configured maximum number of node executions
        limit: usize,
        /// Last node that ran before the budget ran out
        last_node: String,
    },
    /// An edge or entry point names a node that was never registered
    #[display("Unknown node: {}", _0)]
    UnknownNode(String),
    /// A registered node has no outgoing edge
    #[display("Node '{}' has no outgoing edge", _0)]
    MissingEdge(String),
    /// A node was given both a static and a conditional edge
    #[display("Node '{}' has more than one outgoing edge definition", _0)]
    DuplicateEdge(String),
    /// The graph has no entry point
    #[display("No entry point set")]
    NoEntryPoint,
}

/// Workflow error with source location tracking.
///
/// # Examples
///
/// ```
/// use quill_error::{WorkflowError, WorkflowErrorKind};
///
/// let err = WorkflowError::new(WorkflowErrorKind::StepBudgetExceeded {
///     limit: 10,
///     last_node: "advance".to_string(),
/// });
/// assert!(format!("{}", err).contains("Step budget"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Workflow Error: {} at line {} in {}", kind, line, file)]
pub struct WorkflowError {
    /// The kind of error that occurred
    pub kind: WorkflowErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl WorkflowError {
    /// Create a new WorkflowError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: WorkflowErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// True if this error is the step-budget circuit breaker.
    pub fn is_step_budget(&self) -> bool {
        matches!(self.kind, WorkflowErrorKind::StepBudgetExceeded { .. })
    }
}
