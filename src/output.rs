//! CLI output formatting for the build commands.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity
//! (experience entry, project, title) is shown by its semantic identity:
//! positional index and name. Source files appear as indented context lines,
//! so the output reads as a content inventory while still pointing back to
//! the JSON file that defines each entry.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Profile
//!     Jane Doe (Network Engineer)
//!     Source: profile.json
//!     Links: GitHub, LinkedIn
//!
//! Experience
//! 001 Northwind Networks (current)
//!     Senior Network Engineer, 2022 - Present
//!
//! Projects
//! 001 NetPulse [featured, in progress]
//!     Category: Monitoring
//!
//! Config
//!     config.toml
//!     assets/
//! ```
//!
//! ## Build
//!
//! ```text
//! index.html
//! robots.txt
//! sitemap.xml
//! Assets
//!     favicon.svg
//!
//! Generated 3 experience entries, 3 projects, 1 asset
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. Diagnostics go through
//! `tracing` to stderr, never through here.

use crate::config::TypewriterConfig;
use crate::content::{self, Manifest};
use crate::generate::GenerateReport;
use crate::submission::{ContactForm, SubmitError};
use std::io::Write;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Positional index + title, with optional parenthesized detail.
///
/// ```text
/// 001 Northwind Networks (current)
/// 002 Contoso Cloud
/// ```
fn entity_header(index: usize, title: &str, detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!("{} {} ({})", format_index(index), title, d),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(manifest: &Manifest, source_root: &Path, current_year: i32) -> Vec<String> {
    let mut lines = Vec::new();
    let profile = &manifest.profile;

    lines.push("Profile".to_string());
    lines.push(format!("{}{} ({})", indent(1), profile.name, profile.title));
    lines.push(format!("{}Source: {}", indent(1), content::PROFILE_FILE));
    if !profile.social_links.is_empty() {
        let platforms: Vec<&str> = profile
            .social_links
            .iter()
            .map(|l| l.platform.as_str())
            .collect();
        lines.push(format!("{}Links: {}", indent(1), platforms.join(", ")));
    }

    if !manifest.experience.is_empty() {
        lines.push(String::new());
        lines.push("Experience".to_string());
        for (i, exp) in manifest.experience.iter().enumerate() {
            let detail = exp.is_current(current_year).then_some("current");
            lines.push(entity_header(i + 1, &exp.company, detail));
            lines.push(format!("{}{}, {}", indent(1), exp.position, exp.period));
            if !exp.technologies.is_empty() {
                lines.push(format!(
                    "{}Technologies: {}",
                    indent(1),
                    exp.technologies.join(", ")
                ));
            }
        }
    }

    if !manifest.projects.is_empty() {
        lines.push(String::new());
        lines.push("Projects".to_string());
        for (i, project) in manifest.projects.iter().enumerate() {
            let mut flags = Vec::new();
            if project.featured {
                flags.push("featured".to_string());
            }
            if let Some(status) = project.status.badge() {
                flags.push(status.to_lowercase());
            }
            let title = if flags.is_empty() {
                format!("{} {}", format_index(i + 1), project.title)
            } else {
                format!("{} {} [{}]", format_index(i + 1), project.title, flags.join(", "))
            };
            lines.push(title);
            lines.push(format!("{}Category: {}", indent(1), project.category));
            lines.push(format!(
                "{}Description: {}",
                indent(1),
                truncate_desc(&project.description, 60)
            ));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join(crate::config::CONFIG_FILE).exists() {
        lines.push(format!("{}{}", indent(1), crate::config::CONFIG_FILE));
    } else {
        lines.push(format!("{}(stock defaults)", indent(1)));
    }
    if manifest.assets_dir.is_some() {
        lines.push(format!("{}{}/", indent(1), content::ASSETS_DIR));
    }

    lines
}

pub fn print_check_output(manifest: &Manifest, source_root: &Path, current_year: i32) {
    for line in format_check_output(manifest, source_root, current_year) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines: Vec<String> = report.pages.clone();

    if !report.assets.is_empty() {
        lines.push("Assets".to_string());
        for asset in &report.assets {
            lines.push(format!("{}{}", indent(1), asset));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}",
        plural(report.experience_count, "experience entry", "experience entries"),
        plural(report.project_count, "project", "projects"),
        plural(report.assets.len(), "asset", "assets"),
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Titles
// ============================================================================

pub fn format_titles(config: &TypewriterConfig) -> Vec<String> {
    let mut lines = vec!["Titles".to_string()];
    for (i, title) in config.titles.iter().enumerate() {
        lines.push(entity_header(i + 1, title, None));
    }
    lines.push(String::new());
    lines.push(format!(
        "Typing {}ms, deleting {}ms, pause {}ms",
        config.type_delay_ms, config.delete_delay_ms, config.pause_ms
    ));
    lines
}

pub fn print_titles(config: &TypewriterConfig) {
    for line in format_titles(config) {
        println!("{}", line);
    }
}

/// Redraw the current terminal line with a typewriter frame.
pub fn print_frame(text: &str) {
    let mut stdout = std::io::stdout().lock();
    // A closed stdout only loses the preview.
    let _ = write!(stdout, "\r\x1b[2K{}|", text);
    let _ = stdout.flush();
}

// ============================================================================
// Contact
// ============================================================================

/// Field errors (in display order), the status banner, then the cause of a
/// failed send. The banner is the same for every failure; the cause line
/// tells a network problem from a relay rejection.
pub fn format_submission(form: &ContactForm, outcome: &Result<(), SubmitError>) -> Vec<String> {
    let mut lines: Vec<String> = form
        .errors()
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect();
    if let Some(banner) = form.banner() {
        lines.push(banner.to_string());
    }
    match outcome {
        Err(err @ (SubmitError::Network(_) | SubmitError::Relay(_) | SubmitError::SpamRejected)) => {
            lines.push(format!("Cause: {}", err));
        }
        Err(SubmitError::Invalid(_) | SubmitError::InFlight) | Ok(()) => {}
    }
    lines
}

pub fn print_submission(form: &ContactForm, outcome: &Result<(), SubmitError>) {
    for line in format_submission(form, outcome) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn entity_header_with_detail() {
        assert_eq!(
            entity_header(1, "Northwind Networks", Some("current")),
            "001 Northwind Networks (current)"
        );
    }

    #[test]
    fn entity_header_without_detail() {
        assert_eq!(entity_header(2, "Contoso Cloud", None), "002 Contoso Cloud");
    }

    #[test]
    fn truncate_desc_short() {
        assert_eq!(truncate_desc("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_desc_long() {
        let text = "a".repeat(50);
        assert_eq!(truncate_desc(&text, 40), format!("{}...", "a".repeat(40)));
    }

    #[test]
    fn truncate_desc_respects_char_boundaries() {
        assert_eq!(truncate_desc("ééééé", 3), "ééé...");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "project", "projects"), "1 project");
        assert_eq!(plural(0, "project", "projects"), "0 projects");
    }

    // =========================================================================
    // Check output
    // =========================================================================

    #[test]
    fn check_output_lists_content_inventory() {
        let tmp = setup_fixtures();
        let manifest = crate::content::load(tmp.path()).unwrap();
        let lines = format_check_output(&manifest, tmp.path(), 2026);

        assert_eq!(lines[0], "Profile");
        assert!(lines.iter().any(|l| l == "001 Northwind Networks (current)"));
        assert!(lines.iter().any(|l| l == "002 Contoso Cloud"));
        assert!(lines.iter().any(|l| l.starts_with("001 ") && l.contains("[featured, in progress]")));
        assert!(lines.iter().any(|l| l == "    config.toml"));
        assert!(lines.iter().any(|l| l == "    assets/"));
    }

    #[test]
    fn check_output_without_config_file_says_defaults() {
        let tmp = setup_fixtures();
        std::fs::remove_file(tmp.path().join("config.toml")).unwrap();
        let manifest = crate::content::load(tmp.path()).unwrap();
        let lines = format_check_output(&manifest, tmp.path(), 2026);
        assert!(lines.iter().any(|l| l == "    (stock defaults)"));
    }

    // =========================================================================
    // Build output
    // =========================================================================

    #[test]
    fn generate_output_lists_files_and_summary() {
        let report = GenerateReport {
            pages: vec!["index.html".into(), "robots.txt".into(), "sitemap.xml".into()],
            assets: vec!["favicon.svg".into()],
            experience_count: 3,
            project_count: 1,
        };
        let lines = format_generate_output(&report);
        assert_eq!(lines[0], "index.html");
        assert!(lines.contains(&"Assets".to_string()));
        assert!(lines.contains(&"    favicon.svg".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Generated 3 experience entries, 1 project, 1 asset"
        );
    }

    #[test]
    fn generate_output_omits_empty_assets() {
        let report = GenerateReport {
            pages: vec!["index.html".into()],
            ..Default::default()
        };
        let lines = format_generate_output(&report);
        assert!(!lines.contains(&"Assets".to_string()));
    }

    #[test]
    fn submission_lists_field_errors() {
        use crate::validation::Field;
        let mut form = ContactForm::new();
        form.set_field(Field::Email, "bad");
        let outcome = form.begin_submit().map(|_| ());
        let lines = format_submission(&form, &outcome);
        assert_eq!(lines[0], "name: Name is required");
        assert_eq!(lines[1], "email: Please enter a valid email address");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn submission_shows_banner_on_spam() {
        use crate::validation::Field;
        let mut form = ContactForm::new();
        form.set_field(Field::Name, "Jane Doe");
        form.set_field(Field::Email, "jane@example.com");
        form.set_field(Field::Message, "Hello there, interested in working together.");
        form.set_field(Field::Honeypot, "http://spam.example");
        let outcome = form.begin_submit().map(|_| ());
        assert_eq!(
            format_submission(&form, &outcome),
            vec![
                crate::validation::messages::SUBMIT_FAILED.to_string(),
                "Cause: honeypot field was filled in".to_string(),
            ]
        );
    }

    #[test]
    fn submission_names_network_and_relay_causes() {
        let mut form = ContactForm::new();
        let network = form.finish_submit(Err(SubmitError::Network("connection refused".to_string())));
        let lines = format_submission(&form, &network);
        assert_eq!(lines.last().unwrap(), "Cause: network error: connection refused");

        let relay = form.finish_submit(Ok(crate::submission::RelayResponse::failed("quota exceeded")));
        let lines = format_submission(&form, &relay);
        assert_eq!(lines.last().unwrap(), "Cause: relay reported failure: quota exceeded");
    }

    #[test]
    fn successful_submission_has_no_cause_line() {
        let mut form = ContactForm::new();
        let outcome = form.finish_submit(Ok(crate::submission::RelayResponse::ok("sent")));
        assert_eq!(
            format_submission(&form, &outcome),
            vec![crate::validation::messages::SUBMIT_SUCCEEDED.to_string()]
        );
    }

    #[test]
    fn titles_are_listed_with_delays() {
        let manifest = fixture_manifest();
        let lines = format_titles(&manifest.config.typewriter);
        assert_eq!(lines[0], "Titles");
        assert_eq!(lines[2], "002 Infrastructure Architect");
        assert!(lines.last().unwrap().starts_with("Typing "));
    }
}
