//! In-place step reporting for conversion jobs
//!
//! Each step is shown on a single spinner line that is replaced by the next
//! one. Log output goes through the same handle (see the [`MakeWriter`] impl),
//! so the spinner is lifted off the terminal while a log line is written and
//! no warning gets painted over.
//!
//! When stderr is not a terminal, or in debug mode (where the converter's own
//! output is interleaved), every step is printed as a plain line instead.

use console::{Term, style};
use crd2kcl_core::JobEvent;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// Transient status line on stderr, shared with the log writer
#[derive(Debug, Clone)]
pub struct StepLine {
    bar: ProgressBar,
    /// Print every step as its own line instead of animating one
    keep: bool,
}

impl StepLine {
    pub fn new(verbose: bool) -> Self {
        let keep = verbose || !Term::stderr().is_term();
        if keep {
            return Self {
                bar: ProgressBar::hidden(),
                keep,
            };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
            bar.set_style(spinner);
        }
        Self { bar, keep }
    }

    /// Replace the current status line with `message`
    pub fn show(&self, message: String) {
        if self.keep {
            eprintln!("{}", message);
            return;
        }
        if self.bar.is_finished() {
            return;
        }
        self.bar.enable_steady_tick(Duration::from_millis(100));
        self.bar.set_message(message);
    }

    /// Print a permanent line to stdout without disturbing the status line
    pub fn println(&self, line: String) {
        self.bar.suspend(|| println!("{}", line));
    }

    /// Remove the status line for good
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Render a job event
    pub fn on_event(&self, event: JobEvent<'_>) {
        match event {
            JobEvent::Fetching { name, url } => self.show(format!(
                "{} {} {}",
                style("↓").blue(),
                style(name).bold(),
                style(format!("from {}", url)).dim()
            )),
            JobEvent::Converting { name, input, .. } => self.show(format!(
                "{} {} {}",
                style("⟳").cyan(),
                style(name).bold(),
                style(format!("converting {}", input.display())).dim()
            )),
            JobEvent::Converted { name, output } => self.println(format!(
                "  {} {} {}",
                style("✓").green().bold(),
                name,
                style(format!("→ {}", output.display())).dim()
            )),
            JobEvent::Organizing => self.show(format!(
                "{} {}",
                style("⟳").cyan(),
                style("Organizing by API version").dim()
            )),
            JobEvent::Compacting => self.show(format!(
                "{} {}",
                style("⟳").cyan(),
                style("Removing empty directories").dim()
            )),
            JobEvent::Fetched { .. } => {}
        }
    }
}

/// stderr writer that suspends the status line around each write
pub struct LogWriter {
    bar: ProgressBar,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bar.suspend(|| io::stderr().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.bar.suspend(|| io::stderr().write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for StepLine {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            bar: self.bar.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_steps_without_terminal_are_kept() {
        let steps = StepLine::new(true);
        assert!(steps.keep);
        assert!(steps.bar.is_hidden());

        steps.on_event(JobEvent::Organizing);
        steps.on_event(JobEvent::Converted {
            name: "widget_v1",
            output: Path::new("modules/widgets/v1/widget_v1.k"),
        });
        steps.finish();
    }

    #[test]
    fn test_log_writer_passes_bytes_through() {
        let steps = StepLine::new(true);
        let mut writer = steps.make_writer();

        writer.write_all(b"").unwrap();
        writer.flush().unwrap();
    }
}
