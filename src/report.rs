use std::io::{self, Write};

use colored::Colorize as _;

use crate::formats::BatchSummary;

const SEPARATOR_WIDTH: usize = 58;

/// Human-readable per-row console output.
///
/// Colors come from `colored`, which drops them when stdout is not a terminal
/// or `NO_COLOR` is set.
pub struct Reporter<W> {
    out: W,
    debug: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, debug: bool) -> Self {
        Self { out, debug }
    }

    pub fn banner(&mut self, project_name: &str, url: &str) -> io::Result<()> {
        let title = format!("{project_name}:{url}");
        writeln!(self.out, "##### {} #####", title.bold().underline())?;
        writeln!(self.out, "|")
    }

    pub fn success(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "|  {}", message.green())?;
        writeln!(self.out, "|")
    }

    /// `status` is only shown in debug mode, and only when the failure has one.
    pub fn error(&mut self, message: &str, status: Option<u16>) -> io::Result<()> {
        writeln!(self.out, "|  {}", message.red())?;
        if self.debug {
            let status = status.map_or_else(|| "n/a".to_owned(), |code| code.to_string());
            writeln!(
                self.out,
                "|  {}",
                format!("[DEBUG] Status code {status}").blue()
            )?;
            writeln!(self.out, "|")?;
        }
        Ok(())
    }

    pub fn separator(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "-".repeat(SEPARATOR_WIDTH))
    }

    pub fn summary(&mut self, summary: &BatchSummary, finished_at: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "{}",
            format!(
                "Processed {} rows: {} projects created, {} crawls launched, {} failed",
                summary.rows, summary.created, summary.launched, summary.failed
            )
            .bold()
        )?;
        writeln!(self.out, "Finished at: {finished_at}")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).expect("utf-8 output")
    }

    #[test]
    fn banner_names_project_and_url() -> anyhow::Result<()> {
        let mut reporter = Reporter::new(Vec::new(), false);
        reporter.banner("demo", "https://example.com")?;
        let out = output(reporter);
        assert!(out.starts_with("##### "));
        assert!(out.contains("demo:https://example.com"));
        assert!(out.ends_with("#####\n|\n"));
        Ok(())
    }

    #[test]
    fn error_hides_status_without_debug() -> anyhow::Result<()> {
        let mut reporter = Reporter::new(Vec::new(), false);
        reporter.error("Error. Cannot launch the crawl.", Some(500))?;
        let out = output(reporter);
        assert!(out.contains("Error. Cannot launch the crawl."));
        assert!(!out.contains("[DEBUG]"));
        Ok(())
    }

    #[test]
    fn error_echoes_status_in_debug() -> anyhow::Result<()> {
        let mut reporter = Reporter::new(Vec::new(), true);
        reporter.error("boom", Some(409))?;
        reporter.error("transport", None)?;
        let out = output(reporter);
        assert!(out.contains("[DEBUG] Status code 409"));
        assert!(out.contains("[DEBUG] Status code n/a"));
        Ok(())
    }

    #[test]
    fn separator_is_a_dashed_line() -> anyhow::Result<()> {
        let mut reporter = Reporter::new(Vec::new(), false);
        reporter.separator()?;
        assert_eq!(output(reporter), format!("{}\n", "-".repeat(58)));
        Ok(())
    }
}
