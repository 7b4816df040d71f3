pub mod backend;
pub mod manager;
pub mod novem;
pub mod uri;

pub use backend::{FileStat, VfsBackend};
pub use manager::{OpenDocument, VfsEvent, VfsManager};
pub use novem::NovemFsBackend;
pub use uri::{NovemUri, NOVEM_SCHEME};
