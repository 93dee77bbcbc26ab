/// Marker trait for intents.
///
/// Intents are user actions (typing a search term, paging) or navigation
/// events (back/forward re-parsing the URL).
pub trait Intent: Send + 'static {}
