pub mod config_io;
pub mod data_dir;
pub mod lock;
pub mod task_file;
pub mod watcher;
