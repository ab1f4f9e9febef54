/* ************************************************************************ **
** This file is part of cvkit, and is licensed under EITHER the MIT license **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! One-call setup of the global logger.

use crate::FailResult;

use ::std::fmt;
use ::std::path::{Path, PathBuf};
use ::std::time::Instant;

use ::log::{Level, LevelFilter};

/// Builder-style setup for logging
#[derive(Debug, Clone, Default)]
pub struct GlobalLogger {
    path: Option<PathBuf>,
    verbosity: Verbosity,
}

impl GlobalLogger {
    /// NOTE: Relative paths will not be resolved until apply() is called.
    pub fn path<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.path = Some(path.as_ref().to_owned());
        self
    }

    /// Any integer will be accepted; the level will be truncated
    /// to the most extreme value supported.
    pub fn verbosity(&mut self, level: i32) -> &mut Self {
        self.verbosity = match level > 0 {
            true => Verbosity::Loud,
            false => Verbosity::Default,
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Verbosity { Default, Loud }

impl Default for Verbosity {
    fn default() -> Self { Verbosity::Default }
}

impl GlobalLogger {
    /// NOTE: I'm not sure what happens (or don't particularly care)
    ///       if this is called multiple times. It won't be UB, but
    ///       it probably also won't make sense.
    pub fn apply(&mut self) -> FailResult<()> {
        let start = Instant::now();

        // per-pair evaluation and pair list rebuilds are chatty
        let chatty = match self.verbosity {
            Verbosity::Default => LevelFilter::Debug,
            Verbosity::Loud => LevelFilter::Trace,
        };

        let mut fern = ::fern::Dispatch::new();
        fern = fern.format(move |out, message, record| {
                let t = start.elapsed();
                out.finish(format_args!("[{:>4}.{:03}s][{}][{}] {}",
                    t.as_secs(),
                    t.subsec_nanos() / 1_000_000,
                    record.target(),
                    ColorizedLevel(record.level()),
                    message))
            })
            .level(LevelFilter::Debug)
            .level_for("cvkit", LevelFilter::Trace)
            .level_for("cvkit_colvars", LevelFilter::Trace)
            .level_for("cvkit_adjmat", chatty)
            .level_for("cvkit_system", chatty)
            .chain(::std::io::stdout());

        if let Some(path) = self.path.as_ref() {
            fern = fern.chain(::fern::log_file(path)?);
        }

        fern.apply()?;
        Ok(())
    }
}

#[derive(Debug, Copy, Clone)]
pub struct ColorizedLevel(pub Level);

impl fmt::Display for ColorizedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = match self.0 {
            Level::Error => ::ansi_term::Colour::Red.bold(),
            Level::Warn  => ::ansi_term::Colour::Red.normal(),
            Level::Info  => ::ansi_term::Colour::Cyan.bold(),
            Level::Debug => ::ansi_term::Colour::Yellow.dimmed(),
            Level::Trace => ::ansi_term::Colour::Cyan.normal(),
        };
        write!(f, "{}", style.paint(self.0.to_string()))
    }
}
