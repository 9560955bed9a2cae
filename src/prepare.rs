use std::fs::OpenOptions;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use anyhow::Context as _;
use colored::Colorize as _;
use url::Url;

use crate::cli::PrepareArgs;

/// Upper bound on pages per crawl; larger requests are clamped.
pub const MAX_URLS_CAP: u64 = 100_000;

const SECONDS_PER_CRAWL: u64 = 40;
const PROJECT_SUFFIX: &str = "__bbl";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCrawl {
    pub start_url: String,
    pub project_name: String,
}

pub fn run(args: PrepareArgs) -> anyhow::Result<()> {
    let prefix = args.prefix.trim();
    if prefix.is_empty() {
        anyhow::bail!("--prefix must not be empty");
    }
    if args.max_urls == 0 {
        anyhow::bail!("--max-urls must be > 0");
    }
    let max_urls = clamp_max_urls(args.max_urls);
    if max_urls != args.max_urls {
        tracing::warn!(requested = args.max_urls, max_urls, "max urls clamped");
    }

    let contents = std::fs::read_to_string(&args.urls)
        .with_context(|| format!("read url list: {}", args.urls.display()))?;
    let start_urls = parse_start_urls(&contents)
        .with_context(|| format!("validate url list: {}", args.urls.display()))?;
    println!(
        "{}",
        format!("{} validated successfully", args.urls.display()).green()
    );
    println!("No. of sites to crawl: {}", start_urls.len());

    let plan = start_urls
        .iter()
        .map(|url| plan_crawl(url, prefix))
        .collect::<anyhow::Result<Vec<_>>>()?;

    ensure_writable(&args.out, args.force)?;
    ensure_writable(&args.project_list, args.force)?;
    write_csv(&args.out, &plan, max_urls)?;
    write_project_list(&args.project_list, &plan, &args.app_url, &args.organization)?;

    tracing::info!(
        crawls = plan.len(),
        out = %args.out.display(),
        project_list = %args.project_list.display(),
        "prepared crawl csv"
    );

    println!("Project prefix name: {prefix}");
    println!("No. URLs to crawl: {max_urls}");
    println!("No. crawls to generate: {}", plan.len());
    println!(
        "Your crawls will be available in the following project: {}",
        project_page(&args.app_url, &args.organization, None)
    );
    println!(
        "Estimated time to generate all crawls is {} minutes",
        estimated_minutes(plan.len())
    );
    println!(
        "{}",
        format!("Run `crawlbot -i {}` to launch them.", args.out.display()).bold()
    );

    Ok(())
}

/// Returns the non-comment lines of a URL list, normalized to end in `/`.
///
/// Fails listing every line that is not an `https://` URL with a host.
pub fn parse_start_urls(contents: &str) -> anyhow::Result<Vec<String>> {
    let mut urls = Vec::new();
    let mut invalid = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let valid = line.starts_with("https://")
            && Url::parse(line).is_ok_and(|url| url.host_str().is_some());
        if !valid {
            invalid.push(format!("line {}: {line}", idx + 1));
            continue;
        }
        urls.push(with_trailing_slash(line));
    }

    if !invalid.is_empty() {
        anyhow::bail!(
            "URLs incorrectly formatted (all URLs must start with https://):\n{}",
            invalid.join("\n")
        );
    }
    Ok(urls)
}

pub fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_owned()
    } else {
        format!("{url}/")
    }
}

/// Host (and port, when explicit) of an absolute URL.
pub fn extract_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    })
}

pub fn project_name(prefix: &str, domain: &str) -> String {
    format!("{prefix}_{domain}{PROJECT_SUFFIX}")
}

pub fn clamp_max_urls(requested: u64) -> u64 {
    requested.min(MAX_URLS_CAP)
}

pub fn estimated_minutes(crawls: usize) -> u64 {
    (crawls as u64 * SECONDS_PER_CRAWL).div_ceil(60)
}

fn plan_crawl(start_url: &str, prefix: &str) -> anyhow::Result<PlannedCrawl> {
    let domain = extract_domain(start_url)
        .ok_or_else(|| anyhow::anyhow!("url must have host: {start_url}"))?;
    Ok(PlannedCrawl {
        start_url: start_url.to_owned(),
        project_name: project_name(prefix, &domain),
    })
}

fn project_page(app_url: &str, organization: &str, project: Option<&str>) -> String {
    let app_url = app_url.trim_end_matches('/');
    match project {
        Some(project) => format!("{app_url}/{organization}/{project}"),
        None => format!("{app_url}/{organization}"),
    }
}

fn ensure_writable(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "output already exists: {} (use --force to overwrite)",
            path.display()
        );
    }
    Ok(())
}

fn write_csv(path: &Path, plan: &[PlannedCrawl], max_urls: u64) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create crawl csv: {}", path.display()))?;
    writer
        .write_record(["URL", "Project Name", "Max URLs"])
        .context("write crawl csv header")?;
    let max_urls = max_urls.to_string();
    for crawl in plan {
        writer
            .write_record([
                crawl.start_url.as_str(),
                crawl.project_name.as_str(),
                max_urls.as_str(),
            ])
            .context("write crawl csv record")?;
    }
    writer.flush().context("flush crawl csv")?;
    Ok(())
}

fn write_project_list(
    path: &Path,
    plan: &[PlannedCrawl],
    app_url: &str,
    organization: &str,
) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .with_context(|| format!("create project list: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for crawl in plan {
        let page = project_page(app_url, organization, Some(&crawl.project_name));
        writeln!(out, "{},{page}", crawl.start_url).context("write project list line")?;
    }
    out.flush().context("flush project list")?;
    Ok(())
}
