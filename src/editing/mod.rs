//! Caret model and the reflow trigger policy

mod caret;
mod trigger;

pub use caret::{doc_offset, document_text, Caret, PHOTO_PLACEHOLDER};
pub use trigger::{apply_event, EditEvent, TimerKey, TimerQueue, TimerTask};
