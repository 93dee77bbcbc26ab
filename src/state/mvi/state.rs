/// Marker trait for state values.
///
/// `PartialEq` lets callers skip work when a reduction changed nothing.
pub trait UiState: Clone + PartialEq + Default + Send + 'static {}
