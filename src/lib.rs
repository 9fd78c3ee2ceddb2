// Library root
// -----------
// Smoke-test harness for the image resize API. The binary (`main.rs`)
// wires these modules together.
//
// Module responsibilities:
// - `api`: builds and sends the create/delete/get requests.
// - `config`: fixture defaults, config file and environment overrides.
// - `smoke`: the scripted create/get(/delete) run.
// - `ui`: interactive menu that delegates to `api`.
// - `logging`: tracing subscriber setup.
pub mod api;
pub mod config;
pub mod logging;
pub mod smoke;
pub mod ui;
