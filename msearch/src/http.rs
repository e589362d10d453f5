use mcommon::Deadline;
use reqwest::RequestBuilder;

use crate::SearchError;

/// Caps `builder` at the time left on `deadline`.
pub(crate) fn bounded(
    builder: RequestBuilder,
    deadline: Option<Deadline>,
    service: &str,
) -> Result<RequestBuilder, SearchError> {
    match deadline {
        Some(deadline) if deadline.is_expired() => Err(SearchError::timeout(format!(
            "{service} deadline expired before dispatch"
        ))),
        Some(deadline) => Ok(builder.timeout(deadline.remaining())),
        None => Ok(builder),
    }
}
