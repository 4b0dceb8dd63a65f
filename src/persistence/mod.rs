pub mod files;
pub mod state;
pub mod storage;

pub use files::{
    atomic_write, ensure_data_dir, get_data_dir, init_local_dir, read_file, report_file,
    state_file,
};
pub use state::{from_json, to_json, StoreState};
pub use storage::{FileStorage, MemoryStorage, StateStorage};
