//! Binary entrypoint that plays a scripted match chat against the in-memory registry.

use std::process::ExitCode;

use courtside_agents::match_chat_demo;

/// Run the match chat and report how it went.
fn main() -> ExitCode {
    match_chat_demo::run()
}
