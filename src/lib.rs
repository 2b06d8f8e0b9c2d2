pub mod cli;
pub mod load_settings;
pub mod merger;
pub mod paths;
pub mod settings;
pub mod storage;
