use std::process::ExitCode;

use perplexity_mcp::{cli, infra};

fn main() -> ExitCode {
    infra::logging::init();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    let code = runtime.block_on(cli::run());
    // A stdio session stopped by Ctrl-C leaves a stdin read parked on the
    // blocking pool; do not wait for it.
    runtime.shutdown_background();
    code
}
