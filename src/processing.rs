//! Failure processing: the single seam between a failed comparison and the caller.
//!
//! Every comparison routes its failure through [`process`]. With a tracker (soft mode) the
//! failure is recorded and the call returns `Ok(())`; without one (hard mode) a fail event is
//! emitted and the failure is raised as `AssertionError::Immediate`.

use crate::compare::ComparisonFailure;
use crate::error::AssertionError;
use crate::log::LogDispatcher;
use crate::tracker::ErrorTracker;

/// Records `cause` into `tracker`, or logs and raises it when there is no tracker.
pub fn process(
    log: &LogDispatcher,
    message: Option<&str>,
    tracker: Option<&mut ErrorTracker>,
    cause: ComparisonFailure,
) -> Result<(), AssertionError> {
    let message = message.filter(|text| !text.is_empty());

    match tracker {
        Some(tracker) => {
            match message {
                Some(text) => tracker.add_error(text, cause),
                None => tracker.add_cause(cause),
            }
            Ok(())
        }
        None => {
            log.fail_with_cause(message.unwrap_or(""), &cause);
            Err(AssertionError::Immediate {
                message: message.map(str::to_string),
                cause: Some(cause),
            })
        }
    }
}
