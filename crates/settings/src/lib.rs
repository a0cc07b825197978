pub mod plist;
pub mod theme;

pub use plist::{Element, Node};
pub use theme::{read_scope_entry, EntrySkip, ScopeEntry, ScopeSettings, ThemeLoadError};
