//! Reporting mode: strict, silent and verbose.
//!
//! | Call      | strict          | non-strict | silent     | verbose   |
//! |-----------|-----------------|------------|------------|-----------|
//! | `error()` | returns `Err`   | logged     | logged     | logged    |
//! | `warn()`  | logged          | logged     | suppressed | logged    |
//! | `info()`  | verbose only    | verbose only | suppressed | logged  |
//!
//! Every call is counted whether or not it was printed, so callers and
//! tests can inspect what a run produced.

use crate::{config::ReportConfig, error::EngineError, log};
use std::{cell::Cell, fmt::Display};

#[derive(Debug, Default)]
pub struct Reporter {
    strict: bool,
    silent: bool,
    verbose: bool,
    errors: Cell<usize>,
    warnings: Cell<usize>,
    infos: Cell<usize>,
}

impl Reporter {
    pub fn new(report: &ReportConfig) -> Self {
        Self {
            strict: report.strict,
            silent: report.silent,
            verbose: report.verbose,
            ..Self::default()
        }
    }

    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    pub const fn is_verbose(&self) -> bool {
        self.verbose && !self.silent
    }

    /// Raise `err` in strict mode, log it otherwise.
    pub fn error(&self, err: EngineError) -> Result<(), EngineError> {
        bump(&self.errors);
        if self.strict {
            return Err(err);
        }
        log!("error"; "{}", err.chain());
        Ok(())
    }

    /// Never fatal.
    pub fn warn(&self, message: impl Display) {
        bump(&self.warnings);
        if !self.silent {
            log!("warn"; "{message}");
        }
    }

    /// Diagnostic detail, printed in verbose mode only.
    pub fn info(&self, message: impl Display) {
        bump(&self.infos);
        if self.is_verbose() {
            log!("info"; "{message}");
        }
    }

    /// Regular progress output under a module prefix.
    pub fn status(&self, module: &str, message: impl Display) {
        if !self.silent {
            log!(module; "{message}");
        }
    }

    pub fn errors(&self) -> usize {
        self.errors.get()
    }

    pub fn warnings(&self) -> usize {
        self.warnings.get()
    }

    pub fn infos(&self) -> usize {
        self.infos.get()
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}
