//! HTML site generation.
//!
//! Stage 2 of the build. Takes the loaded [`Manifest`] and writes the final
//! static site.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html     # The whole portfolio: hero, experience, projects, contact
//! ├── robots.txt
//! ├── sitemap.xml
//! └── ...            # Everything under content/assets/, copied verbatim
//! ```
//!
//! ## Page Sections
//!
//! - **Header**: fixed nav with scroll-spy, mobile menu, theme toggle
//! - **Hero** (`#hero`): avatar, name, bio, rotating title, social links
//! - **Experience** (`#experience`): cards; responsibilities and achievements
//!   collapse into a `<details>` element
//! - **Projects** (`#projects`): card grid with status/featured badges
//! - **Contact** (`#contact`): form posting JSON to the relay endpoint
//! - **Footer**: location and copyright
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time and inlined into the page:
//! - `static/style.css`: layout and components (colors injected from config)
//! - `static/site.js`: header, theme toggle, typewriter, contact form
//!
//! The inline script is whitelisted by hash in the server's
//! Content-Security-Policy; see [`script_csp_source`].
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All interpolated content is escaped; only rendered markdown and the
//! embedded CSS/JS go through `PreEscaped`.

use crate::config::{self, SiteConfig, TypewriterConfig};
use crate::content::Manifest;
use crate::types::{Experience, Profile, Project, SocialLink};
use crate::ui::{NAV_SCROLL_OFFSET, SCROLLED_THRESHOLD, SPY_PROBE_OFFSET, SectionId, Theme};
use crate::validation::ValidationRules;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{Datelike, NaiveDate};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Asset copy error: {0}")]
    Walk(#[from] walkdir::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/site.js");

/// What a build wrote, for CLI output.
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    /// Generated files, relative to the output directory.
    pub pages: Vec<String>,
    /// Files copied from `assets/`, relative to the output directory.
    pub assets: Vec<String>,
    pub experience_count: usize,
    pub project_count: usize,
}

/// Build date: drives the "Current" badge, the footer year and sitemap `lastmod`.
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

pub fn generate(
    manifest: &Manifest,
    output_dir: &Path,
    build_date: NaiveDate,
) -> Result<GenerateReport, GenerateError> {
    fs::create_dir_all(output_dir)?;
    let mut report = GenerateReport {
        experience_count: manifest.experience.len(),
        project_count: manifest.projects.len(),
        ..Default::default()
    };

    if let Some(assets) = &manifest.assets_dir {
        report.assets = copy_assets(assets, output_dir)?;
    }

    let page = render_page(manifest, build_date.year());
    fs::write(output_dir.join("index.html"), page.into_string())?;
    report.pages.push("index.html".to_string());

    let site_url = &manifest.config.site.url;
    fs::write(output_dir.join("robots.txt"), render_robots(site_url))?;
    report.pages.push("robots.txt".to_string());

    fs::write(
        output_dir.join("sitemap.xml"),
        render_sitemap(site_url, build_date),
    )?;
    report.pages.push("sitemap.xml".to_string());

    Ok(report)
}

/// Copy `assets/` into the output root, preserving structure.
fn copy_assets(src: &Path, dst: &Path) -> Result<Vec<String>, GenerateError> {
    let mut copied = Vec::new();
    for entry in walkdir::WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied.push(rel_display(rel));
        }
    }
    Ok(copied)
}

fn rel_display(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// CSP source expression for the inline page script: `'sha256-…'`.
pub fn script_csp_source() -> String {
    let digest = Sha256::digest(JS.as_bytes());
    format!("'sha256-{}'", BASE64.encode(digest))
}

fn markdown(text: &str) -> Markup {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new(text));
    PreEscaped(out)
}

/// Turn a site-relative path into an absolute URL under `base`.
fn absolute_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Resolved `<head>` metadata: config values with profile fallbacks.
#[derive(Debug, Clone)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub share_title: String,
    pub keywords: Vec<String>,
    pub author: String,
    pub canonical_url: String,
    pub og_image: String,
    pub site_name: String,
    pub locale: String,
    pub twitter_handle: String,
    pub theme_color: String,
    pub google_verification: Option<String>,
}

impl PageMeta {
    pub fn resolve(config: &SiteConfig, profile: &Profile) -> Self {
        let site = &config.site;
        let title = if site.title.is_empty() {
            profile.name.clone()
        } else {
            site.title.clone()
        };
        let description = if site.description.is_empty() {
            profile.description.clone()
        } else {
            site.description.clone()
        };
        Self {
            share_title: format!("{} - {}", profile.name, profile.title),
            site_name: format!("{} Portfolio", profile.name),
            title,
            description,
            keywords: site.keywords.clone(),
            author: profile.name.clone(),
            canonical_url: site.url.clone(),
            og_image: absolute_url(&site.url, &site.og_image),
            locale: site.locale.clone(),
            twitter_handle: site.twitter_handle.clone(),
            theme_color: site.theme_color.clone(),
            google_verification: site.google_verification.clone(),
        }
    }
}

fn seo_head(meta: &PageMeta) -> Markup {
    html! {
        title { (meta.title) }
        meta name="description" content=(meta.description);
        @if !meta.keywords.is_empty() {
            meta name="keywords" content=(meta.keywords.join(", "));
        }
        meta name="author" content=(meta.author);
        meta name="creator" content=(meta.author);
        meta name="publisher" content=(meta.author);
        meta name="robots" content="index, follow";
        meta name="googlebot" content="index, follow, max-video-preview:-1, max-image-preview:large, max-snippet:-1";
        link rel="canonical" href=(meta.canonical_url);
        link rel="author" href=(meta.canonical_url);

        meta property="og:type" content="website";
        meta property="og:locale" content=(meta.locale);
        meta property="og:url" content=(meta.canonical_url);
        meta property="og:site_name" content=(meta.site_name);
        meta property="og:title" content=(meta.share_title);
        meta property="og:description" content=(meta.description);
        meta property="og:image" content=(meta.og_image);
        meta property="og:image:width" content="1200";
        meta property="og:image:height" content="630";
        meta property="og:image:alt" content=(meta.share_title);

        meta name="twitter:card" content="summary_large_image";
        meta name="twitter:title" content=(meta.share_title);
        meta name="twitter:description" content=(meta.description);
        meta name="twitter:image" content=(meta.og_image);
        @if !meta.twitter_handle.is_empty() {
            meta name="twitter:creator" content=(meta.twitter_handle);
        }
        @if let Some(token) = &meta.google_verification {
            meta name="google-site-verification" content=(token);
        }
        meta name="theme-color" content=(meta.theme_color);
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(meta: &PageMeta, css: &str, theme: Theme, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" data-theme=(theme.as_str()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                (seo_head(meta))
                link rel="icon" href="/favicon.ico";
                style { (PreEscaped(css)) }
            }
            body {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Fixed site header: brand, desktop nav, theme toggle, mobile menu.
pub fn render_header(owner: &str) -> Markup {
    html! {
        header.site-header #site-header
            data-scrolled-threshold=(SCROLLED_THRESHOLD)
            data-spy-offset=(SPY_PROBE_OFFSET)
            data-nav-offset=(NAV_SCROLL_OFFSET) {
            div.header-inner {
                a.brand href="#hero" aria-label="Go to top" { (owner) }
                nav.desktop-nav aria-label="Sections" {
                    @for section in SectionId::ALL {
                        a.nav-link.active[section == SectionId::Hero]
                            href={ "#" (section.anchor()) }
                            data-section=(section.anchor()) { (section.label()) }
                    }
                }
                div.header-actions {
                    (theme_toggle())
                    button.menu-toggle #menu-toggle type="button"
                        aria-label="Toggle mobile menu" aria-expanded="false"
                        aria-controls="mobile-menu" data-mobile-menu {
                        span.menu-bar {}
                        span.menu-bar {}
                        span.menu-bar {}
                    }
                }
            }
            nav.mobile-menu #mobile-menu hidden data-mobile-menu aria-label="Sections" {
                @for section in SectionId::ALL {
                    a.nav-link href={ "#" (section.anchor()) } data-section=(section.anchor()) {
                        (section.label())
                    }
                }
            }
        }
    }
}

fn theme_toggle() -> Markup {
    html! {
        button.theme-toggle type="button" aria-label="Toggle color theme" {
            span.theme-icon.theme-icon-light aria-hidden="true" { "☀" }
            span.theme-icon.theme-icon-dark aria-hidden="true" { "☾" }
        }
    }
}

fn social_icon(icon: &str) -> Markup {
    let path = match icon {
        "Github" => "M12 2a10 10 0 0 0-3.2 19.5c.5.1.7-.2.7-.5v-1.7c-2.8.6-3.4-1.3-3.4-1.3-.5-1.2-1.1-1.5-1.1-1.5-.9-.6.1-.6.1-.6 1 .1 1.5 1 1.5 1 .9 1.5 2.3 1.1 2.9.8.1-.6.3-1.1.6-1.3-2.2-.3-4.6-1.1-4.6-5 0-1.1.4-2 1-2.7-.1-.3-.4-1.3.1-2.7 0 0 .8-.3 2.8 1a9.6 9.6 0 0 1 5 0c1.9-1.3 2.8-1 2.8-1 .5 1.4.2 2.4.1 2.7.6.7 1 1.6 1 2.7 0 3.9-2.3 4.7-4.6 5 .4.3.7.9.7 1.9v2.8c0 .3.2.6.7.5A10 10 0 0 0 12 2z",
        "Linkedin" => "M4.98 3.5a2.5 2.5 0 1 1 0 5 2.5 2.5 0 0 1 0-5zM3 9h4v12H3zM9 9h3.8v1.7h.1c.5-1 1.8-2 3.8-2 4 0 4.8 2.7 4.8 6.1V21h-4v-5.5c0-1.3 0-3-1.8-3s-2.1 1.4-2.1 2.9V21H9z",
        "Twitter" => "M18.2 2.3h3.4l-7.4 8.4 8.7 11.5h-6.8l-5.3-7-6.1 7H1.3l7.9-9L.9 2.3h7l4.8 6.3zm-1.2 17.9h1.9L7 4.2H5z",
        "Instagram" => "M12 7.4a4.6 4.6 0 1 0 0 9.2 4.6 4.6 0 0 0 0-9.2zm0 7.6a3 3 0 1 1 0-6 3 3 0 0 1 0 6zM17.8 5a1.1 1.1 0 1 0 0 2.2 1.1 1.1 0 0 0 0-2.2zM12 2c-2.7 0-3 0-4.1.1C4.3 2.3 2.3 4.3 2.1 7.9 2 9 2 9.3 2 12s0 3 .1 4.1c.2 3.6 2.2 5.6 5.8 5.8 1.1.1 1.4.1 4.1.1s3 0 4.1-.1c3.6-.2 5.6-2.2 5.8-5.8.1-1.1.1-1.4.1-4.1s0-3-.1-4.1c-.2-3.6-2.2-5.6-5.8-5.8C15 2 14.7 2 12 2z",
        _ => "M10.6 13.4a1 1 0 0 1 0-1.4l3-3a1 1 0 1 1 1.4 1.4l-3 3a1 1 0 0 1-1.4 0zM8.5 16.9l-1.4-1.4a3 3 0 0 1 0-4.2l2-2-1.4-1.4-2 2a5 5 0 0 0 0 7l1.4 1.4a5 5 0 0 0 7 0l2-2-1.4-1.4-2 2a3 3 0 0 1-4.2 0zm9.9-9.8L17 5.7a5 5 0 0 0-7 0l-2 2 1.4 1.4 2-2a3 3 0 0 1 4.2 0l1.4 1.4a3 3 0 0 1 0 4.2l-2 2 1.4 1.4 2-2a5 5 0 0 0 0-7z",
    };
    html! {
        svg.icon viewBox="0 0 24 24" width="20" height="20" aria-hidden="true" {
            path fill="currentColor" d=(path) {}
        }
    }
}

fn render_social_link(link: &SocialLink) -> Markup {
    html! {
        a.social-link href=(link.url) target="_blank" rel="noopener noreferrer"
            aria-label={ "Visit " (link.platform) " profile" } {
            (social_icon(&link.icon))
        }
    }
}

/// Hero: identity, bio, rotating title and social links.
pub fn render_hero(profile: &Profile, typewriter: &TypewriterConfig) -> Markup {
    // Titles are plain strings: serialization cannot fail.
    let titles_json = serde_json::to_string(&typewriter.titles).unwrap_or_else(|_| "[]".into());
    let first_title = typewriter.titles.first().map(String::as_str).unwrap_or("");

    html! {
        section.hero #(SectionId::Hero.anchor()) {
            div.hero-inner {
                div.avatar {
                    @if let Some(avatar) = &profile.avatar {
                        img src=(avatar) alt=(profile.name) width="192" height="192";
                    } @else {
                        span.avatar-placeholder aria-hidden="true" {
                            (profile.name.chars().next().unwrap_or('?'))
                        }
                    }
                }
                h1.hero-heading {
                    "Hello! My name is"
                    br;
                    span.hero-name { (profile.name) }
                }
                div.hero-bio { (markdown(&profile.description)) }
                p.typewriter #typewriter
                    data-titles=(titles_json)
                    data-type-delay=(typewriter.type_delay_ms)
                    data-delete-delay=(typewriter.delete_delay_ms)
                    data-pause=(typewriter.pause_ms)
                    aria-label=(typewriter.titles.join(", ")) {
                    span.typewriter-text aria-hidden="true" { (first_title) }
                    span.typewriter-cursor aria-hidden="true" { "|" }
                }
                @if !profile.social_links.is_empty() {
                    div.social-links {
                        @for link in &profile.social_links {
                            (render_social_link(link))
                        }
                    }
                }
            }
        }
    }
}

fn badge(text: &str, variant: &str) -> Markup {
    html! {
        span class={ "badge badge-" (variant) } { (text) }
    }
}

fn tech_list(technologies: &[String]) -> Markup {
    html! {
        @if !technologies.is_empty() {
            ul.tech-list {
                @for tech in technologies {
                    li { (badge(tech, "outline")) }
                }
            }
        }
    }
}

fn render_experience_card(exp: &Experience, current_year: i32) -> Markup {
    html! {
        article.card.experience-card #{ "experience-" (exp.id) } {
            div.company-logo {
                @if let Some(logo) = &exp.logo {
                    img src=(logo) alt={ (exp.company) " logo" } loading="lazy";
                } @else {
                    span.logo-placeholder aria-hidden="true" {}
                }
            }
            div.experience-body {
                div.card-title-row {
                    h3 { (exp.company) }
                    @if exp.is_current(current_year) {
                        (badge("Current", "success"))
                    }
                }
                p.position { (exp.position) }
                p.meta {
                    span.period { (exp.period) }
                    @if let Some(location) = &exp.location {
                        span.separator aria-hidden="true" { "•" }
                        span.location { (location) }
                    }
                    span.separator aria-hidden="true" { "•" }
                    span.employment { (exp.employment_type.label()) }
                }
                p.description { (exp.description) }
                (tech_list(&exp.technologies))
                @if exp.has_details() {
                    details.experience-details {
                        summary { "Details" }
                        @if !exp.responsibility.is_empty() {
                            h4 { "Key Responsibilities" }
                            ul.bullets {
                                @for task in &exp.responsibility {
                                    li { (task) }
                                }
                            }
                        }
                        @if !exp.achievements.is_empty() {
                            h4 { "Key Achievements" }
                            ul.bullets.achievements {
                                @for achievement in &exp.achievements {
                                    li { (achievement) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Work history, in file order.
pub fn render_experience(experience: &[Experience], current_year: i32) -> Markup {
    html! {
        section.section #(SectionId::Experience.anchor()) {
            h2.section-title { "Professional Experience" }
            div.experience-list {
                @for exp in experience {
                    (render_experience_card(exp, current_year))
                }
            }
        }
    }
}

fn render_project_card(project: &Project) -> Markup {
    html! {
        article.card.project-card #{ "project-" (project.id) } {
            div.project-preview {
                @if let Some(image) = &project.image {
                    img src=(image) alt=(project.title) loading="lazy";
                } @else {
                    span { "Project Preview" }
                }
            }
            div.project-body {
                div.card-title-row {
                    h3 { (project.title) }
                    @if project.featured {
                        (badge("Featured", "accent"))
                    }
                    @if let Some(status) = project.status.badge() {
                        (badge(status, "warning"))
                    }
                }
                div.description { (markdown(&project.description)) }
                p.category { (badge(&project.category, "outline")) }
                (tech_list(&project.technologies))
                div.project-actions {
                    @if let Some(url) = &project.demo_url {
                        a.button.button-outline href=(url) target="_blank" rel="noopener noreferrer" { "Demo" }
                    }
                    @if let Some(url) = &project.github_url {
                        a.button.button-outline href=(url) target="_blank" rel="noopener noreferrer" { "Code" }
                    }
                }
            }
        }
    }
}

/// Project card grid, in file order.
pub fn render_projects(projects: &[Project]) -> Markup {
    html! {
        section.section #(SectionId::Projects.anchor()) {
            h2.section-title { "Featured Projects" }
            div.project-grid {
                @for project in projects {
                    (render_project_card(project))
                }
            }
        }
    }
}

fn form_field(name: &str, label: &str, required: bool, control: Markup) -> Markup {
    html! {
        div.field {
            label for={ "contact-" (name) } {
                (label)
                @if required { " *" }
            }
            (control)
            p.field-error data-error-for=(name) hidden {}
        }
    }
}

/// Contact form. Submission is handled by the page script, which posts JSON
/// to `endpoint`. Without JavaScript the form still posts to the same path.
pub fn render_contact(endpoint: &str) -> Markup {
    use crate::validation::messages::{SUBMIT_FAILED, SUBMIT_SUCCEEDED};
    let rules = ValidationRules::default();

    html! {
        section.section #(SectionId::Contact.anchor()) {
            h2.section-title { "Get In Touch" }
            div.card.contact-card {
                div.banner.banner-success #contact-success role="status" hidden { (SUBMIT_SUCCEEDED) }
                div.banner.banner-error #contact-error role="alert" hidden { (SUBMIT_FAILED) }
                form #contact-form method="post" action=(endpoint) novalidate
                    data-endpoint=(endpoint) data-rules=(rules.to_json()) {
                    input.honeypot type="text" name="honeypot" tabindex="-1" autocomplete="off" aria-hidden="true";
                    div.field-row {
                        (form_field("name", "Name", true, html! {
                            input #contact-name name="name" type="text" required
                                maxlength=(rules.name_max) placeholder="Your name";
                        }))
                        (form_field("email", "Email", true, html! {
                            input #contact-email name="email" type="email" required
                                maxlength=(rules.email_max) placeholder="your.email@example.com";
                        }))
                    }
                    (form_field("subject", "Subject", false, html! {
                        input #contact-subject name="subject" type="text"
                            maxlength=(rules.subject_max) placeholder="What's this about?";
                    }))
                    (form_field("message", "Message", true, html! {
                        textarea #contact-message name="message" rows="5" required
                            maxlength=(rules.message_max)
                            placeholder="Tell me about your project or just say hello!" {}
                    }))
                    button.button.submit-button type="submit" {
                        span.label-idle { "Send Message" }
                        span.label-busy hidden { "Sending..." }
                    }
                }
            }
        }
    }
}

pub fn render_footer(profile: &Profile, year: i32) -> Markup {
    html! {
        footer.site-footer {
            p.footer-location { "📍 " (profile.location) }
            p.footer-copyright {
                "© " (year) " " (profile.name) ". Built with passion for technology and automation."
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the complete single-page portfolio.
pub fn render_page(manifest: &Manifest, current_year: i32) -> Markup {
    let config = &manifest.config;
    let meta = PageMeta::resolve(config, &manifest.profile);
    let css = format!(
        "{}\n\n{}",
        config::generate_color_css(&config.colors),
        CSS_STATIC
    );

    let content = html! {
        (render_header(&manifest.profile.name))
        main {
            (render_hero(&manifest.profile, &config.typewriter))
            @if !manifest.experience.is_empty() {
                (render_experience(&manifest.experience, current_year))
            }
            @if !manifest.projects.is_empty() {
                (render_projects(&manifest.projects))
            }
            (render_contact(&config.contact.endpoint))
        }
        (render_footer(&manifest.profile, current_year))
    };

    base_document(&meta, &css, config.site.default_theme, content)
}

pub fn render_robots(site_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        absolute_url(site_url, "sitemap.xml")
    )
}

pub fn render_sitemap(site_url: &str, lastmod: NaiveDate) -> String {
    let loc = absolute_url(site_url, "");
    let doc = html! {
        (PreEscaped(r#"<?xml version="1.0" encoding="UTF-8"?>"#))
        "\n"
        urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" {
            url {
                loc { (loc) }
                lastmod { (lastmod.format("%Y-%m-%d").to_string()) }
                changefreq { "monthly" }
                priority { "1.0" }
            }
        }
    };
    doc.into_string()
}

/// Where `generate` will write, for callers that want to print it up front.
pub fn index_path(output_dir: &Path) -> PathBuf {
    output_dir.join("index.html")
}

// ============================================================================
// Tests
// ============================================================================
