use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

const DEFAULT_FILTER: &str = "warn,reelsmith=info";

/// Initialise `env_logger`; `RUST_LOG` overrides the default filter
pub fn init_logger() {
    let env = Env::default().filter_or("RUST_LOG", DEFAULT_FILTER);

    let mut builder = Builder::from_env(env);

    // HTTP internals are far too chatty at info
    builder
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("mio", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Warn)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}
