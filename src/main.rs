use colored::Colorize;
use tddcov::core::error::CoverageError;

fn main() {
    if let Err(e) = tddcov::run() {
        match e {
            // The report on stdout already lists every failure.
            CoverageError::ValidationError(_) => {}
            CoverageError::ConfigError(_) | CoverageError::ConfigParse(_) => {
                eprintln!(
                    "{} {}",
                    "tddcov:".bright_red().bold(),
                    "configuration invalid; see --help".bright_white()
                );
            }
            other => eprintln!("{} {}", "tddcov:".bright_red().bold(), other),
        }
        std::process::exit(1);
    }
}
