use env_logger::{Builder, Env};

/// Install the global logger
///
/// `RUST_LOG` takes precedence; otherwise `level` is used. Calling this more
/// than once is harmless, later calls are ignored.
pub fn init(level: &str) {
    let env = Env::default().default_filter_or(level);
    let _ = Builder::from_env(env)
        .format_timestamp_secs()
        .format_target(false)
        .try_init();
}

#[cfg(test)]
pub fn init_for_tests() {
    let _ = Builder::from_env(Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
