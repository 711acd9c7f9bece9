mod linked;
mod notes;
mod scripts;
mod walk;

pub use linked::{LinkedExtractor, LinkedResourceKind, ResourceRecord};
pub use notes::{NoteRecord, NotesExtractor};
pub use scripts::{ScriptExtractor, ScriptRecord};
pub use walk::walk_objects;
