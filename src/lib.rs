pub mod archive;
pub mod cli;
pub mod database_ops;
pub mod merge;
pub mod normalization;

pub mod util {
    pub mod env;
    pub mod tracing;
}
