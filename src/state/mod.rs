//! Client-side application state: list filters, dialog visibility and the
//! current selection, owned by one [`AppStore`].

mod dialogs;
mod filters;
pub mod mvi;
mod selection;
mod store;

pub use dialogs::{Dialog, DialogIntent, DialogReducer, DialogState};
pub use filters::{
    normalize_tag, FilterIntent, FilterReducer, FilterState, ListSource, ALL_TAGS, DEFAULT_LIMIT,
};
pub use selection::Selection;
pub use store::{AppState, AppStore};
