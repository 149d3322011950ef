//! Line-oriented command loop
//!
//! Each line is one viewer operation. Failures are reported inline and the
//! loop keeps going; only I/O errors on the terminal itself end it.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use anyhow::{bail, Result};
use flamegraph_chart::{ChartSession, FlamegraphRenderer};
use span_tree::SpanId;
use crate::report;

const DEFAULT_STATS_ROWS: usize = 20;

const HELP: &str = "\
commands:
  load <file>...       replace the trace with these exports
  search <pattern>     highlight spans whose name matches
  ignorecase on|off    toggle case-insensitive search
  clear                drop the search highlight
  click <id>           zoom into a span
  reset                reset zoom
  details <id>         show span details
  stats [rows]         per-name statistics
  help                 this text
  quit                 leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(Vec<PathBuf>),
    Search(String),
    IgnoreCase(bool),
    Clear,
    Click(SpanId),
    Reset,
    Details(SpanId),
    Stats(usize),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "load" => {
                if rest.is_empty() {
                    bail!("load needs at least one file");
                }
                Command::Load(rest.split_whitespace().map(PathBuf::from).collect())
            }
            "search" => Command::Search(rest.to_string()),
            "ignorecase" => match rest {
                "on" => Command::IgnoreCase(true),
                "off" => Command::IgnoreCase(false),
                _ => bail!("ignorecase takes 'on' or 'off'"),
            },
            "clear" => Command::Clear,
            "click" | "zoom" => Command::Click(Self::span_id(rest)?),
            "reset" => Command::Reset,
            "details" => Command::Details(Self::span_id(rest)?),
            "stats" => match rest {
                "" => Command::Stats(DEFAULT_STATS_ROWS),
                n => Command::Stats(n.parse()?),
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command '{}', try 'help'", other),
        };
        Ok(command)
    }

    fn span_id(raw: &str) -> Result<SpanId> {
        if raw.is_empty() {
            bail!("missing span id");
        }
        Ok(SpanId::parse(raw))
    }
}

/// Run commands from `input` until `quit` or end of input
pub fn run<R, I, O>(session: &mut ChartSession<R>, input: I, out: &mut O) -> Result<()>
where
    R: FlamegraphRenderer,
    I: BufRead,
    O: Write,
{
    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(e) = execute(session, command, out) {
            writeln!(out, "error: {e}")?;
        }
    }
    Ok(())
}

fn execute<R: FlamegraphRenderer, O: Write>(
    session: &mut ChartSession<R>,
    command: Command,
    out: &mut O,
) -> Result<()> {
    match command {
        Command::Load(paths) => {
            let dataset = session.on_files_selected(paths)?;
            report::write_summary(out, &dataset)?;
        }
        Command::Search(term) => {
            let count = session.search(&term)?;
            writeln!(out, "{} match(es)", count)?;
        }
        Command::IgnoreCase(on) => {
            session.set_ignore_case(on)?;
            writeln!(out, "ignore case {}", if on { "on" } else { "off" })?;
        }
        Command::Clear => session.clear()?,
        Command::Click(id) => session.click(&id)?,
        Command::Reset => session.reset_zoom()?,
        Command::Details(id) => write!(out, "{}", session.details(&id)?)?,
        Command::Stats(rows) => {
            let dataset = session.dataset().ok_or(flamegraph_chart::SessionError::NoData)?;
            report::write_stats(out, &dataset.stats, rows)?;
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}
