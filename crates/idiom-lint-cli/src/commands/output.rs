//! Shared output formatting for reports.

use anyhow::Result;
use idiom_lint_core::{Finding, FindingDiagnostic, ProjectSummary, Report, Severity, TypeSummary};
use miette::NamedSource;
use std::collections::HashMap;
use std::fmt::Write;
use std::path::PathBuf;

use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Compact => print!("{}", render_compact(report)),
        OutputFormat::Markdown => print!("{}", render_markdown(report)),
    }
    Ok(())
}

fn print_text(report: &Report) {
    let mut sources: HashMap<PathBuf, Option<String>> = HashMap::new();

    for finding in report.findings.iter().filter(|f| !f.is_positive()) {
        let content = finding.file.as_ref().and_then(|file| {
            sources
                .entry(file.clone())
                .or_insert_with(|| std::fs::read_to_string(file).ok())
                .clone()
                .map(|content| (file, content))
        });

        match content {
            Some((file, content)) => {
                let diagnostic = miette::Report::new(FindingDiagnostic::new(finding, &content))
                    .with_source_code(NamedSource::new(file.display().to_string(), content));
                println!("{diagnostic:?}");
            }
            None => println!("{}", finding.format()),
        }
    }

    for failure in &report.failures {
        println!(
            "\x1b[33mskipped\x1b[0m {}: {}",
            failure.path.display(),
            failure.message
        );
    }

    let summary_color = if report.counts.errors > 0 {
        "\x1b[31m"
    } else if report.counts.warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    println!("{summary_color}{}\x1b[0m", report.summary());
}

/// One `location: severity [code] message` line per finding.
pub fn render_compact(report: &Report) -> String {
    report.findings.iter().fold(String::new(), |mut out, f| {
        let _ = writeln!(out, "{f}");
        out
    })
}

/// Markdown summary with findings grouped by severity.
pub fn render_markdown(report: &Report) -> String {
    let counts = &report.counts;
    let mut out = String::from("# idiom-lint report\n\n");
    let _ = writeln!(out, "**Score:** {}/100\n", report.score);
    out.push_str("| Errors | Warnings | Info | Good patterns | Files |\n");
    out.push_str("|--------|----------|------|---------------|-------|\n");
    let _ = writeln!(
        out,
        "| {} | {} | {} | {} | {} |",
        counts.errors, counts.warnings, counts.infos, counts.positives, report.files_checked
    );

    if let Some(project) = &report.project {
        markdown_project(&mut out, project);
    }

    let sections = [
        ("Errors", report.by_severity(Severity::Error)),
        ("Warnings", report.by_severity(Severity::Warning)),
        ("Info", report.by_severity(Severity::Info)),
        ("Good patterns", report.positives()),
    ];
    for (title, findings) in sections {
        if findings.is_empty() {
            continue;
        }
        let _ = write!(out, "\n## {title}\n\n");
        for finding in findings {
            markdown_item(&mut out, finding);
        }
    }

    if !report.types.is_empty() {
        markdown_types(&mut out, &report.types);
    }

    if !report.failures.is_empty() {
        out.push_str("\n## Skipped\n\n");
        for failure in &report.failures {
            let _ = writeln!(out, "- `{}`: {}", failure.path.display(), failure.message);
        }
    }
    out
}

fn markdown_project(out: &mut String, project: &ProjectSummary) {
    out.push_str("\n## Project information\n\n");
    let _ = writeln!(out, "- **Name:** {}", project.name);
    let _ = writeln!(out, "- **Version:** {}", project.version);
    let _ = writeln!(out, "- **Edition:** {}", project.edition);
    if let Some(license) = &project.license {
        let _ = writeln!(out, "- **License:** {license}");
    }

    if project.dependencies.is_empty() {
        return;
    }
    out.push_str("\n## Dependencies\n\n");
    for dep in &project.dependencies {
        let dev = if dep.dev { " (dev)" } else { "" };
        let _ = writeln!(out, "- `{}` {}{dev}", dep.name, dep.version);
    }
}

fn markdown_types(out: &mut String, types: &[TypeSummary]) {
    out.push_str("\n## Types found\n\n");
    out.push_str("| Type | Kind | Location | Derives |\n");
    out.push_str("|------|------|----------|---------|\n");
    for ty in types {
        let location = match &ty.file {
            Some(file) => format!("{}:{}", file.display(), ty.line),
            None => format!("line {}", ty.line),
        };
        let derives = if ty.derives.is_empty() {
            "-".to_string()
        } else {
            ty.derives.join(", ")
        };
        let _ = writeln!(
            out,
            "| `{}` | {} | {location} | {derives} |",
            ty.name, ty.kind
        );
    }
}

fn markdown_item(out: &mut String, finding: &Finding) {
    let location = match &finding.file {
        Some(file) if finding.line > 0 => format!("{}:{}", file.display(), finding.line),
        Some(file) => file.display().to_string(),
        None => format!("line {}", finding.line),
    };
    let _ = writeln!(
        out,
        "- `{}` {} at {}: {}",
        finding.code(),
        finding.pattern,
        location,
        finding.message
    );
    if let Some(suggestion) = &finding.suggestion {
        let _ = writeln!(out, "  - help: {suggestion}");
    }
}
