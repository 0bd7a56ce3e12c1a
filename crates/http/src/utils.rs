//! Utility macros shared by the parser and the response writer.

/// Returns early with an error if a condition is not met.
///
/// This is similar to `assert!`, but returns the error instead of panicking.
/// The state machines use it to reject illegal transitions before touching
/// any buffer or sink.
///
/// # Example
///
/// ```ignore
/// ensure!(self.state == WriterState::AwaitingHeaders, WriteError::invalid_state(self.state, WriterState::AwaitingHeaders));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
