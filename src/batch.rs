use std::io::{self, Write};
use std::path::Path;

use anyhow::Context as _;

use crate::client::{BotifyClient, ProjectService};
use crate::config::Config;
use crate::error::{MalformedRow, RowFailure};
use crate::formats::{BatchSummary, CsvRow};
use crate::report::Reporter;
use crate::rows::RowReader;

const CREATE_FAILED: &str = "Error. Cannot create the project. You may have provided a duplicate project prefix. Try again and use a different one.";
const CREATE_SUCCEEDED: &str = "Project was successfully created";
const LAUNCH_FAILED: &str = "Error. Cannot launch the crawl.";

/// Where a single row ended up. `Failed` can follow either remote call.
#[derive(Debug)]
pub enum RowOutcome {
    Launched {
        project_slug: String,
        analysis_slug: String,
    },
    Failed {
        /// The project exists remotely even though the crawl was not launched.
        project_created: bool,
        failure: RowFailure,
    },
}

pub fn run(config: &Config, input: &Path) -> anyhow::Result<BatchSummary> {
    let mut rows = RowReader::open(input)?;
    let client = BotifyClient::new(config).context("build api client")?;

    tracing::info!(
        input = %input.display(),
        organization = %config.organization,
        api_url = %config.api_url,
        "batch started"
    );

    let mut reporter = Reporter::new(io::stdout().lock(), config.debug);
    let summary = process_rows(&client, rows.by_ref(), &mut reporter)?;
    rows.finish()?;

    let finished_at = chrono::Local::now().format("%H:%M").to_string();
    reporter
        .summary(&summary, &finished_at)
        .context("write summary")?;
    reporter.flush().context("flush stdout")?;

    tracing::info!(
        rows = summary.rows,
        launched = summary.launched,
        failed = summary.failed,
        "batch finished"
    );
    Ok(summary)
}

/// Runs every row to completion. Only a failure to write the report aborts.
pub fn process_rows<S, W, I>(
    service: &S,
    rows: I,
    reporter: &mut Reporter<W>,
) -> anyhow::Result<BatchSummary>
where
    S: ProjectService + ?Sized,
    W: Write,
    I: IntoIterator<Item = Result<CsvRow, MalformedRow>>,
{
    let mut summary = BatchSummary::default();

    for row in rows {
        summary.rows += 1;
        let outcome = match row {
            Ok(row) => process_row(service, &row, reporter)?,
            Err(malformed) => report_malformed(malformed, reporter)?,
        };
        reporter.separator().context("write separator")?;

        match &outcome {
            RowOutcome::Launched { .. } => {
                summary.created += 1;
                summary.launched += 1;
            }
            RowOutcome::Failed {
                project_created,
                failure,
            } => {
                if *project_created {
                    summary.created += 1;
                }
                summary.failed += 1;
                tracing::warn!(
                    row = summary.rows,
                    status = ?failure.status(),
                    error = %failure,
                    "row failed"
                );
            }
        }
    }

    Ok(summary)
}

/// Banner, create, launch, for one row. The separator is left to the caller.
pub fn process_row<S, W>(
    service: &S,
    row: &CsvRow,
    reporter: &mut Reporter<W>,
) -> anyhow::Result<RowOutcome>
where
    S: ProjectService + ?Sized,
    W: Write,
{
    reporter
        .banner(&row.project_name, &row.start_url)
        .context("write banner")?;

    if row.max_pages.parse::<u64>().is_err() {
        let message = format!(
            "Error. Max pages must be a whole number, got {:?}.",
            row.max_pages
        );
        reporter.error(&message, None).context("write error")?;
        let failure = RowFailure::InvalidMaxPages {
            value: row.max_pages.clone(),
        };
        return Ok(failed(false, failure));
    }

    let created = match service.create_project(row) {
        Ok(created) => created,
        Err(err) => {
            let message = format!("Error. Cannot create the project: {err}");
            reporter.error(&message, None).context("write error")?;
            return Ok(failed(false, err.into()));
        }
    };
    let Some(project_slug) = created.slug.filter(|_| created.status_code == 201) else {
        reporter
            .error(CREATE_FAILED, Some(created.status_code))
            .context("write error")?;
        return Ok(failed(
            false,
            RowFailure::ProjectCreation {
                status: created.status_code,
            },
        ));
    };
    reporter
        .success(CREATE_SUCCEEDED)
        .context("write success")?;

    let launched = match service.launch_crawl(&project_slug) {
        Ok(launched) => launched,
        Err(err) => {
            let message = format!("Error. Cannot launch the crawl: {err}");
            reporter.error(&message, None).context("write error")?;
            return Ok(failed(true, err.into()));
        }
    };
    let Some(analysis_slug) = launched
        .analysis_slug
        .filter(|_| launched.status_code == 201)
    else {
        reporter
            .error(LAUNCH_FAILED, Some(launched.status_code))
            .context("write error")?;
        return Ok(failed(
            true,
            RowFailure::CrawlLaunch {
                status: launched.status_code,
            },
        ));
    };
    reporter
        .success(&format!("Crawl was successfully launched {analysis_slug}"))
        .context("write success")?;

    Ok(RowOutcome::Launched {
        project_slug,
        analysis_slug,
    })
}

fn report_malformed<W: Write>(
    malformed: MalformedRow,
    reporter: &mut Reporter<W>,
) -> anyhow::Result<RowOutcome> {
    let fallback_url = format!("line {}", malformed.line);
    let url = malformed.fields.first().unwrap_or(&fallback_url);
    let name = malformed
        .fields
        .get(1)
        .map_or("malformed row", String::as_str);
    reporter.banner(name, url).context("write banner")?;
    reporter
        .error(&format!("Error. Skipping row: {}", malformed.reason), None)
        .context("write error")?;
    Ok(failed(false, malformed.into()))
}

fn failed(project_created: bool, failure: RowFailure) -> RowOutcome {
    RowOutcome::Failed {
        project_created,
        failure,
    }
}
