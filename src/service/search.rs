//! The search driver.
//!
//! Inputs are processed one at a time in the order given, directories in
//! file-name order. Every candidate goes through the pipeline; accepted ones
//! are written out immediately. Per-file failures are logged and counted,
//! and the run moves on to the next file.

use std::fs::File;
use std::io::{self, BufReader, IsTerminal, Write};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::service::pipeline::{Flow, Offer, Pipeline};
use crate::tools::highlight::Highlighter;
use crate::tools::scanner::DefinitionStream;
use crate::tools::source::LineSource;
use crate::types::{Rejection, SourceId};

const STDIN_PROMPT: &str = "Reading from stdin until EOF (Ctrl + D)...";

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Definitions written out
    pub matched: usize,
    /// Inputs that could not be read
    pub errors: usize,
    /// The max count stopped the run early
    pub limit_reached: bool,
}

/// One run over the configured inputs, writing results to `out`.
pub struct Search<'a, W: Write> {
    config: &'a Config,
    pipeline: Pipeline,
    out: W,
    errors: usize,
}

impl<'a, W: Write> Search<'a, W> {
    pub fn new(config: &'a Config, out: W) -> Self {
        Self {
            config,
            pipeline: Pipeline::new(config.filter.clone()),
            out,
            errors: 0,
        }
    }

    /// Search every input, then write the footer.
    pub fn run(mut self) -> Result<Summary> {
        let config = self.config;
        if config.reads_stdin() {
            self.search_stdin()?;
        } else {
            for input in &config.inputs {
                if self.search_path(input)? == Flow::Stop {
                    break;
                }
            }
        }
        self.finish()
    }

    /// Write the footer and flush.
    pub fn finish(mut self) -> Result<Summary> {
        let summary = Summary {
            matched: self.pipeline.counter().accepted(),
            errors: self.errors,
            limit_reached: self.pipeline.is_done(),
        };

        let renderer = &self.config.renderer;
        if renderer.shows_footer() {
            writeln!(
                self.out,
                "{}",
                renderer.footer(summary.matched, summary.limit_reached)
            )?;
        }
        self.out.flush()?;
        Ok(summary)
    }

    fn search_stdin(&mut self) -> Result<Flow> {
        let stdin = io::stdin();
        if stdin.is_terminal() && io::stdout().is_terminal() {
            eprintln!("\n{}\n", STDIN_PROMPT);
        }
        let source = LineSource::new(SourceId::Stdin, Box::new(stdin.lock()));
        self.search_source(source)
    }

    /// Search a file, or every regular file under a directory.
    pub fn search_path(&mut self, path: &Path) -> Result<Flow> {
        if !path.is_dir() {
            return self.search_file(path);
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.report(Error::Walk(e));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if self.search_file(entry.path())? == Flow::Stop {
                return Ok(Flow::Stop);
            }
        }
        Ok(Flow::Continue)
    }

    fn search_file(&mut self, path: &Path) -> Result<Flow> {
        if !self.config.wants_path(path) {
            debug!("Skipping filtered path: {}", path.display());
            return Ok(Flow::Continue);
        }

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                self.report(Error::file(path, e));
                return Ok(Flow::Continue);
            }
        };
        let source = LineSource::new(
            SourceId::File(path.to_path_buf()),
            Box::new(BufReader::new(file)),
        );
        self.search_source(source)
    }

    /// Scan one source. Read failures are reported; write failures propagate.
    pub fn search_source(&mut self, source: LineSource) -> Result<Flow> {
        match self.scan(source) {
            Ok(flow) => Ok(flow),
            Err(e @ Error::File { .. }) => {
                self.report(e);
                Ok(Flow::Continue)
            }
            Err(e) => Err(e),
        }
    }

    fn scan(&mut self, source: LineSource) -> Result<Flow> {
        let config = self.config;
        let id = source.id().clone();
        let mut stream = DefinitionStream::open(source, config.language)
            .map_err(|e| read_error(&id, e))?;

        let renderer = &config.renderer;
        let highlighter = if renderer.color() {
            Some(Highlighter::for_source(id.path(), stream.variant()))
        } else {
            None
        };

        while let Some(item) = stream.next() {
            let candidate = item.map_err(|e| read_error(&id, e))?;
            match self.pipeline.offer(&candidate) {
                // A name mismatch gives its body back for nested definitions.
                Offer::Rejected(Rejection::Name) => stream.release(candidate),
                Offer::Rejected(_) => {}
                Offer::Accepted(flow) => {
                    writeln!(self.out, "{}", renderer.render(&candidate, highlighter.as_ref()))?;
                    if flow == Flow::Stop {
                        return Ok(Flow::Stop);
                    }
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn report(&mut self, error: Error) {
        if let Error::File { ref path, ref source } = error {
            if source.kind() == io::ErrorKind::InvalidData {
                debug!("Skipping non-UTF-8 input: {}", path.display());
                return;
            }
        }
        warn!("{}", error);
        self.errors += 1;
    }
}

fn read_error(id: &SourceId, e: io::Error) -> Error {
    Error::file(id.to_string(), e)
}
