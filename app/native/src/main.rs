#![allow(clippy::multiple_crate_versions)]

//! mwm - command-line front end for the tiling core.
//!
//! Logging goes to stderr and is controlled by `MWM_LOG` (an `EnvFilter`
//! directive, default `mwm_lib=info`).

use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_time().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("mwm: failed to start runtime: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(mwm_lib::cli::run()) {
        eprintln!("mwm: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MWM_LOG").unwrap_or_else(|_| EnvFilter::new("mwm_lib=info"));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}
