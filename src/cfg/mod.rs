mod config;

pub use config::SorterConfig;
