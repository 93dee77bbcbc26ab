use std::collections::BTreeSet;

use crate::state::mvi::{Intent, Reducer, UiState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dialog {
    AddPost,
    EditPost,
    PostDetail,
    UserProfile,
    AddComment,
    EditComment,
}

/// Which dialogs are visible. Several can be open at once (the comment
/// dialogs stack on top of the post detail).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DialogState {
    open: BTreeSet<Dialog>,
}

impl UiState for DialogState {}

impl DialogState {
    pub fn is_open(&self, dialog: Dialog) -> bool {
        self.open.contains(&dialog)
    }

    pub fn open_dialogs(&self) -> impl Iterator<Item = Dialog> + '_ {
        self.open.iter().copied()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum DialogIntent {
    Open(Dialog),
    Close(Dialog),
}

impl Intent for DialogIntent {}

pub struct DialogReducer;

impl Reducer for DialogReducer {
    type State = DialogState;
    type Intent = DialogIntent;

    fn reduce(mut state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            DialogIntent::Open(dialog) => {
                state.open.insert(dialog);
            }
            DialogIntent::Close(dialog) => {
                state.open.remove(&dialog);
                // Comment dialogs live inside the detail view
                if dialog == Dialog::PostDetail {
                    state.open.remove(&Dialog::AddComment);
                    state.open.remove(&Dialog::EditComment);
                }
            }
        }
        state
    }
}
