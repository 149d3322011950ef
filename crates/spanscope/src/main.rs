//! spanscope: browse trace exports as a flamegraph
//!
//! Usage:
//!   spanscope trace.json                     # draw the chart in the terminal
//!   spanscope a.json b.json -s 'db\.' -i     # merge files, highlight matches
//!   spanscope trace.json --zoom 42 -f json   # chart document for a browser view
//!   spanscope --interactive                  # command loop on stdin

mod args;
mod interactive;
mod logging;
mod report;

use std::io::{self, Write};
use anyhow::{Context, Result};
use clap::Parser;
use flamegraph_chart::{ChartConfig, ChartSession, FlamegraphRenderer, JsonRenderer, SessionError, TextRenderer};
use span_tree::SpanId;
use crate::args::{Args, OutputFormat};

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = logging::init(args.verbose, args.log_file.as_deref())?;

    let mut config = match &args.config {
        Some(path) => ChartConfig::load(path)
            .with_context(|| format!("Failed to load chart config from {}", path.display()))?,
        None => ChartConfig::default(),
    };
    args.apply_overrides(&mut config);
    tracing::debug!("Chart config: {:?}", config);

    match args.format {
        OutputFormat::Text => run(&args, config, TextRenderer::new(io::stdout())),
        OutputFormat::Json => run(&args, config, JsonRenderer::new(io::stdout(), true)),
    }
}

fn run<R: FlamegraphRenderer>(args: &Args, config: ChartConfig, renderer: R) -> Result<()> {
    if args.interactive {
        let mut session = ChartSession::new(config, renderer);
        if !args.files.is_empty() {
            let dataset = session
                .on_files_selected(args.files.clone())
                .context("Failed to load trace files")?;
            report::write_summary(&mut io::stderr(), &dataset)?;
        }
        let stdin = io::stdin();
        return interactive::run(&mut session, stdin.lock(), &mut io::stderr());
    }

    let mut session = ChartSession::new(config, renderer).with_auto_draw(false);
    let dataset = session
        .on_files_selected(args.files.clone())
        .context("Failed to load trace files")?;
    report::write_summary(&mut io::stderr(), &dataset)?;

    if args.stats {
        let mut stdout = io::stdout().lock();
        report::write_stats(&mut stdout, &dataset.stats, usize::MAX)?;
        stdout.flush()?;
        return Ok(());
    }

    if let Some(term) = &args.search {
        match session.search(term) {
            Ok(count) => tracing::info!("{} span(s) match '{}'", count, term),
            Err(SessionError::Search(e)) => eprintln!("error: {e}"),
            Err(e) => return Err(e).context("Search failed"),
        }
    }

    if let Some(id) = &args.zoom {
        session
            .click(&SpanId::parse(id))
            .with_context(|| format!("Cannot zoom to span {}", id))?;
    }

    session.draw().context("Failed to draw chart")?;
    Ok(())
}
