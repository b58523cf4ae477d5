use std::io::{self, Write};

pub struct OutputConfig {
    pub json: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl OutputConfig {
    pub fn from_global(json: bool, verbose: bool, quiet: bool) -> Self {
        Self {
            json,
            verbose,
            quiet,
        }
    }

    /// Print a status/confirmation message (suppressed in quiet and JSON mode).
    pub fn status(&self, msg: &str) {
        if !self.quiet && !self.json {
            println!("{msg}");
        }
    }

    /// Print extra detail (only shown in verbose mode, suppressed in quiet mode).
    pub fn detail(&self, msg: &str) {
        if self.verbose && !self.quiet && !self.json {
            println!("{msg}");
        }
    }

    /// Warnings go to stderr and survive `--quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.json {
            eprintln!("warning: {msg}");
        }
    }

    pub fn error(&self, msg: &str) {
        if !self.json {
            eprintln!("error: {msg}");
        }
    }

    pub fn print_json<T: serde::Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}
