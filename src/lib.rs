//! # Folio
//!
//! A single-page portfolio generator with a built-in contact relay.
//! Your profile, work history and projects are JSON files; the output is one
//! static HTML page (plus robots.txt and sitemap.xml) that any file server
//! can host. A small axum server serves that page and forwards contact-form
//! messages to an email provider, so the provider's access key never reaches
//! the browser.
//!
//! # Architecture: Two Stages and a Relay
//!
//! ```text
//! 1. Load      content/   →  Manifest       (JSON + config.toml → validated data)
//! 2. Generate  Manifest   →  dist/          (HTML, robots.txt, sitemap, assets)
//!    Serve     dist/      +  POST /api/contact → EmailRelay → provider
//! ```
//!
//! The browser side of the contact form, the navigation header and the
//! rotating hero title are plain JavaScript embedded in the page. Their
//! behavior is modelled in Rust as explicit state machines ([`submission`],
//! [`ui`], [`typewriter`]) that share constants and validation rules with the
//! generated page, so the rules are tested once and rendered into the HTML.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | Stage 1: loads and validates the content directory into a [`content::Manifest`] |
//! | [`generate`] | Stage 2: renders the page with Maud, copies assets, writes robots.txt and sitemap.xml |
//! | [`config`] | `config.toml` loading, stock defaults, validation, color CSS generation |
//! | [`types`] | Content types: profile, experience entries, projects |
//! | [`validation`] | Contact form field rules, sanitizing, and the rules exported to the page |
//! | [`submission`] | Contact form state machine and the HTTP transport that posts to the relay |
//! | [`relay`] | Email-provider client behind the [`relay::EmailRelay`] trait |
//! | [`server`] | axum router: static files, contact endpoint, security headers |
//! | [`typewriter`] | Rotating-title state machine and its cancellable tokio driver |
//! | [`ui`] | Header scroll-spy, mobile menu, theme and expand/collapse state |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. Malformed markup is a build error, template variables are
//! Rust expressions, and every interpolation is escaped. Content from the JSON
//! files can't inject markup into the page.
//!
//! ## Validate Twice
//!
//! The page validates the form before sending, for fast feedback. The relay
//! endpoint validates again and sanitizes before anything reaches the email
//! provider, because the endpoint is reachable without the page. Both sides
//! use the limits and messages in [`validation`]; the page receives them as a
//! JSON `data-rules` attribute rather than a second hand-written copy.
//!
//! ## Hash-Pinned Inline Script
//!
//! The page script is inlined and the server's Content-Security-Policy admits
//! it by SHA-256 hash ([`generate::script_csp_source`]). No `'unsafe-inline'`
//! for scripts, and no second request for a script file.

pub mod config;
pub mod content;
pub mod generate;
pub mod output;
pub mod relay;
pub mod server;
pub mod submission;
pub mod types;
pub mod typewriter;
pub mod ui;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_helpers;
