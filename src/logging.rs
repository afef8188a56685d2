use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins when set; otherwise
/// `verbose` picks `debug` for this crate and `info` for everything else.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    // Logs go to stderr so command output on stdout stays machine-readable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose { "info,eqgen=debug" } else { "info" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_parse() {
        for verbose in [false, true] {
            assert!(default_directives(verbose).parse::<EnvFilter>().is_ok());
        }
    }

    #[test]
    fn init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
