use tracing_subscriber::EnvFilter;

/// Entry point for the `git-redate` binary.
///
/// Installs the stderr log subscriber, delegates to the CLI entry function
/// and exits with the returned code, or 1 on error.
fn main() {
    let filter = EnvFilter::try_from_env(git_redate::cli::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match git_redate::cli::entry() {
        Ok(code) => std::process::exit(code),
        Err(_) => std::process::exit(1),
    }
}
