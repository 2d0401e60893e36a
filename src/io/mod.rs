pub mod config_io;
pub mod logging;
pub mod paths;
pub mod record_store;
pub mod recovery;
