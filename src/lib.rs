// Library root
// -----------
// This crate exposes the library surface behind the `radarr-sweep` CLI.
// The binary (`main.rs`) parses arguments and hands off to `commands`.
//
// Module responsibilities:
// - `api`: HTTP calls to the Radarr server with timeout, retry and typed
//   errors.
// - `scanner`, `filter`, `keep_list`, `deleter`: the scan, genre match,
//   keep list and deletion steps.
// - `ui`: terminal output and prompts, behind traits so flows can be
//   tested without a terminal.
// - `commands`: the scan / delete / keep flows wired from the above.
pub mod api;
pub mod commands;
pub mod config;
pub mod deleter;
pub mod error;
pub mod filter;
pub mod keep_list;
pub mod models;
pub mod scanner;
pub mod ui;

pub use error::{Error, Result};
