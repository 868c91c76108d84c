//! Per-root storage settings

pub mod storage_paths;
