//! `sift lint`: lint C# files, print diagnostics, optionally apply fixes.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use sift_engine::linter::{
    Driver, LintConfig, LintResult, Linter, RuleRegistry, Severity, SourceFile,
};
use sift_engine::report::{self, JsonReport, Reporter};
use tracing::{debug, warn};

use super::files::collect_source_files;
use crate::output::{resolve_color_choice, StyledOutput};

/// Name of the config file searched for from the working directory upwards.
pub const MANIFEST_NAME: &str = "sift.toml";

pub struct LintArgs {
    pub paths: Vec<String>,
    pub fix: bool,
    pub prefer: Vec<String>,
    pub format: String,
    pub jobs: Option<usize>,
    pub color: Option<String>,
}

/// One linted file ready for output. `source` is the text the diagnostics
/// refer to, after fixes when `--fix` is on.
struct FileReport {
    path: PathBuf,
    source: String,
    result: LintResult,
}

pub fn execute(args: LintArgs) -> anyhow::Result<ExitCode> {
    // 1. Config: sift.toml, then command-line overrides
    let mut config = load_lint_config()?.unwrap_or_default();
    if args.jobs.is_some() {
        config.jobs = args.jobs;
    }
    let known = RuleRegistry::new();
    for name in config.configured_rules() {
        if known.find(name).is_none() {
            warn!(rule = name, "unknown rule in {}", MANIFEST_NAME);
        }
    }
    let linter = Linter::with_config(config);

    // 2. Collect and read sources
    let paths = collect_source_files(&args.paths)?;
    if paths.is_empty() {
        eprintln!("No .cs files found.");
        return Ok(ExitCode::FAILURE);
    }
    let mut read_errors = 0usize;
    let mut sources = Vec::with_capacity(paths.len());
    for path in &paths {
        match std::fs::read_to_string(path) {
            Ok(text) => sources.push(SourceFile::new(path.display().to_string(), text)),
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                read_errors += 1;
            }
        }
    }

    // 3. Lint (and fix) on the worker pool
    let driver = Driver::new(&linter);
    debug!(files = sources.len(), jobs = driver.jobs(), "linting");
    let (reports, fixed) = if args.fix {
        let prefer: Vec<&str> = args.prefer.iter().map(String::as_str).collect();
        apply_fixes(&driver, &linter, sources, &prefer)?
    } else {
        let reports = driver
            .lint_batch(&sources)
            .into_iter()
            .zip(sources)
            .map(|(linted, file)| FileReport {
                path: PathBuf::from(file.path),
                source: file.text,
                result: linted.result,
            })
            .collect();
        (reports, None)
    };

    // 4. Output diagnostics
    let choice = resolve_color_choice(args.color.as_deref());
    let mut out = StyledOutput::new(choice);
    match args.format.as_str() {
        "json" => emit_json(&reports)?,
        _ => emit_pretty(&mut out, &reports)?,
    }

    let count = |severity: Severity| {
        reports
            .iter()
            .flat_map(|r| &r.result.diagnostics)
            .filter(|d| d.severity == severity)
            .count()
    };
    let errors = count(Severity::Error);
    let warnings = count(Severity::Warning);
    let parse_errors: usize = reports.iter().map(|r| r.result.parse_errors.len()).sum();
    let fixable: usize = reports.iter().map(|r| r.result.fixable_count).sum();

    // 5. Fix report and summary
    if args.format != "json" {
        if let Some((issues, files)) = fixed {
            out.newline();
            out.success(&format!("Fixed {} issue(s) in {} file(s).", issues, files));
            out.newline();
        }
        if fixable > 0 {
            out.newline();
            if args.fix {
                out.info(&format!(
                    "{} issue(s) offer several fixes. Pass `--prefer <FIX_ID>` to choose one.",
                    fixable
                ));
            } else {
                out.info(&format!(
                    "{} issue(s) can be fixed. Run `sift lint --fix` to apply.",
                    fixable
                ));
            }
            out.newline();
        }
        print_summary(&mut out, paths.len(), errors, warnings, parse_errors);
        out.flush();
    }

    // 6. Exit code
    if errors > 0 || read_errors > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Fix every file, write back the changed ones, and return the reports
/// for the fixed text plus `(issues fixed, files written)`.
fn apply_fixes(
    driver: &Driver<'_>,
    linter: &Linter,
    sources: Vec<SourceFile>,
    prefer: &[&str],
) -> anyhow::Result<(Vec<FileReport>, Option<(usize, usize)>)> {
    let outcomes = driver.fix_batch(&sources, prefer);
    let mut reports = Vec::with_capacity(sources.len());
    let mut issues = 0usize;
    let mut files = 0usize;

    for (file, outcome) in sources.into_iter().zip(outcomes) {
        let path = PathBuf::from(&file.path);
        match outcome {
            Ok(outcome) => {
                if outcome.changed() {
                    std::fs::write(&path, &outcome.text)
                        .with_context(|| format!("writing {}", path.display()))?;
                    issues += outcome.applied.len();
                    files += 1;
                }
                reports.push(FileReport {
                    path,
                    source: outcome.text,
                    result: outcome.remaining,
                });
            }
            Err(e) => {
                // Leave the file untouched and report it as it is.
                eprintln!("Could not fix {}: {}", path.display(), e);
                let result = linter.lint_source(&file.text, &file.path);
                reports.push(FileReport {
                    path,
                    source: file.text,
                    result,
                });
            }
        }
    }

    Ok((reports, Some((issues, files))))
}

// Pretty output (codespan)

fn emit_pretty(out: &mut StyledOutput, reports: &[FileReport]) -> anyhow::Result<()> {
    let mut reporter = Reporter::new();
    for report in reports {
        if report.result.diagnostics.is_empty() && report.result.parse_errors.is_empty() {
            continue;
        }
        let file_id = reporter.add_file(report.path.display().to_string(), report.source.clone());
        reporter
            .emit(out.stream(), file_id, &report.result)
            .with_context(|| format!("rendering diagnostics for {}", report.path.display()))?;
    }
    Ok(())
}

// JSON output

fn emit_json(reports: &[FileReport]) -> anyhow::Result<()> {
    let json: Vec<JsonReport> = reports
        .iter()
        .filter(|r| !r.result.diagnostics.is_empty() || !r.result.parse_errors.is_empty())
        .map(|r| JsonReport::new(&r.result, &r.source))
        .collect();
    println!("{}", report::to_json(&json)?);
    Ok(())
}

// Colored summary

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn print_summary(
    out: &mut StyledOutput,
    file_count: usize,
    errors: usize,
    warnings: usize,
    parse_errors: usize,
) {
    out.newline();
    out.plain(&format!("Linted {} file{}: ", file_count, plural(file_count)));
    if errors == 0 && warnings == 0 {
        out.success("no issues found.");
    } else {
        if errors > 0 {
            out.error(&format!("{} error{}", errors, plural(errors)));
        }
        if errors > 0 && warnings > 0 {
            out.plain(", ");
        }
        if warnings > 0 {
            out.warning(&format!("{} warning{}", warnings, plural(warnings)));
        }
        out.plain(".");
    }
    if parse_errors > 0 {
        out.plain(&format!(
            " {} syntax error{} skipped.",
            parse_errors,
            plural(parse_errors)
        ));
    }
    out.newline();
}

// Config loading

/// Load the `[lint]` table of the nearest `sift.toml`, if any.
pub fn load_lint_config() -> anyhow::Result<Option<LintConfig>> {
    let cwd = std::env::current_dir().context("reading working directory")?;
    let Some(manifest_path) = find_manifest(&cwd) else {
        return Ok(None);
    };
    let text = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("reading {}", manifest_path.display()))?;
    let config = LintConfig::from_toml(&text)
        .with_context(|| format!("invalid {}", manifest_path.display()))?;
    debug!(path = %manifest_path.display(), "loaded config");
    Ok(Some(config))
}

/// Walk up from `start` to find `sift.toml`.
fn find_manifest(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_manifest_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(MANIFEST_NAME), "[lint]\n").unwrap();

        assert_eq!(
            find_manifest(&nested),
            Some(dir.path().join(MANIFEST_NAME))
        );
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1), "");
        assert_eq!(plural(0), "s");
        assert_eq!(plural(2), "s");
    }
}
