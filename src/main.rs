use chrono::Datelike;
use clap::{Parser, Subcommand};
use folio::submission::{ContactForm, HttpContactClient, SubmissionStatus};
use folio::validation::Field;
use folio::{config, content, generate, output, server, typewriter};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Single-page portfolio generator and contact relay")]
#[command(long_about = "\
Single-page portfolio generator and contact relay

Your profile, work history and projects live in JSON files. `folio build`
renders them into one static page with a contact form; `folio serve` serves
that page and relays contact messages to an email provider.

Content structure:

  content/
  ├── config.toml          # Site config (optional; see gen-config)
  ├── profile.json         # Name, title, bio, location, social links
  ├── experience.json      # Work history, newest first
  ├── projects.json        # Project cards
  └── assets/              # Favicon, avatar, og-image → copied to output root

The contact relay reads its provider access key from the environment
variable named by [server] access_key_env (default WEB3FORMS_ACCESS_KEY).

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate content directory without building
    Check,
    /// Render the site into the output directory
    Build,
    /// Serve the built site and the contact endpoint
    Serve {
        /// Listen address, overriding [server] bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// List the rotating hero titles
    Titles {
        /// Play the typewriter animation in the terminal
        #[arg(long)]
        animate: bool,
        /// How long to animate, in seconds
        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },
    /// Send a message through a running contact endpoint
    Contact(ContactArgs),
}

#[derive(clap::Args)]
struct ContactArgs {
    /// Endpoint URL (default: http://{server.bind}{contact.endpoint})
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    subject: String,
    #[arg(long)]
    message: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = content::load(&cli.source)?;
            output::print_check_output(&manifest, &cli.source, generate::today().year());
            println!("==> Content is valid");
        }
        Command::Build => {
            println!("==> Loading {}", cli.source.display());
            let manifest = content::load(&cli.source)?;
            let today = generate::today();
            output::print_check_output(&manifest, &cli.source, today.year());

            println!("==> Generating HTML → {}", cli.output.display());
            let report = generate::generate(&manifest, &cli.output, today)?;
            output::print_generate_output(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Serve { bind } => {
            let mut site_config = config::load_config(&cli.source)?;
            if let Some(bind) = bind {
                site_config.server.bind = bind;
                site_config.validate()?;
            }
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(&site_config, cli.output.clone()))?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Titles { animate, seconds } => {
            let site_config = config::load_config(&cli.source)?;
            output::print_titles(&site_config.typewriter);
            if animate {
                let machine = typewriter::Typewriter::from_config(&site_config.typewriter)?;
                let runtime = tokio::runtime::Runtime::new()?;
                runtime.block_on(async {
                    let handle = typewriter::spawn(machine, output::print_frame);
                    tokio::time::sleep(Duration::from_secs(seconds)).await;
                    handle.cancel();
                });
                println!();
            }
        }
        Command::Contact(args) => {
            let site_config = config::load_config(&cli.source)?;
            let url = args.url.unwrap_or_else(|| {
                format!(
                    "http://{}{}",
                    site_config.server.bind, site_config.contact.endpoint
                )
            });

            let mut form = ContactForm::new();
            form.set_field(Field::Name, args.name);
            form.set_field(Field::Email, args.email);
            form.set_field(Field::Subject, args.subject);
            form.set_field(Field::Message, args.message);

            let client = HttpContactClient::new(&url);
            let runtime = tokio::runtime::Runtime::new()?;
            let outcome = runtime.block_on(form.submit(&client));
            if let Err(err) = &outcome {
                tracing::warn!(error = %err, url = %url, "contact message not sent");
            }
            output::print_submission(&form, &outcome);
            if form.status() != SubmissionStatus::Success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
