use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Filter directives for a given `-v` count. The check's own phases come
/// first; library internals only show up once those are at trace.
pub fn verbosity_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "sftp_check=warn",
        1 => "sftp_check=info",
        2 => "sftp_check=debug",
        3 => "sftp_check=trace,russh=info,russh_sftp=info",
        _ => "sftp_check=trace,russh=debug,russh_sftp=debug,russh_keys=debug",
    }
}

/// `RUST_LOG` wins when set.
pub fn create_env_filter(verbosity: u8) -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::new(verbosity_directives(verbosity)),
    }
}

/// Sends diagnostics to stderr so stdout carries only the check result.
/// Colour is used only when a person is watching.
pub fn init_logging(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(create_env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_by_default() {
        assert_eq!(verbosity_directives(0), "sftp_check=warn");
    }

    #[test]
    fn libraries_stay_quiet_until_trace() {
        for verbosity in 0..=2 {
            assert!(!verbosity_directives(verbosity).contains("russh"));
        }
        assert!(verbosity_directives(3).contains("russh=info"));
        assert_eq!(verbosity_directives(4), verbosity_directives(u8::MAX));
    }
}
