//! Integration tests for the mapmaker persona builder

mod cli_commands;
mod cycle_safety;
mod hash_propagation;
mod provider_fallback;
mod refinement;
mod store_export;
mod support;
