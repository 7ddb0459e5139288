// =============================================================================
// ASSET CONSOLE - Library
// =============================================================================
// The data-shaping core of the warehouse asset console: everything that turns
// raw backend rows into what an admin sees, and every check a form runs
// before it is submitted.
//
// Pipeline for list screens:   search (filter) -> sorting -> pagination
// Forms:                       validation, password, submit_lock
// Fetched user lists:          dedupe, identity
//
// All functions here are synchronous and free of I/O. The HTTP service in
// main.rs wires them to the backend.
// =============================================================================

pub mod dedupe;
pub mod friendly;
pub mod identity;
pub mod list_state;
pub mod models;
pub mod pagination;
pub mod password;
pub mod search;
pub mod sorting;
pub mod submit_lock;
pub mod validation;
