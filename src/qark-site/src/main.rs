//! QArk site relay for the marketing site contact form, plus small tools around it.

use anyhow::Context;
use clap::{Parser, Subcommand};
use qark_api::ApiServer;
use qark_channels::{MailProvider, RecordingProvider, ResendProvider};
use qark_contact_form::{ConsoleNotifier, ContactForm, HttpTransport};
use qark_core::config::AppConfig;
use qark_integrations::{MockJiraConnection, MockPipelineRelaunch};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "qark-site")]
#[command(about = "Contact relay and tooling for the QArk marketing site")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the contact relay
    Serve {
        /// Bind address (overrides config)
        #[arg(long, env = "QARK__API__HOST")]
        host: Option<String>,

        /// HTTP port (overrides config)
        #[arg(long, env = "QARK__API__HTTP_PORT")]
        http_port: Option<u16>,

        /// Prometheus exporter port (overrides config)
        #[arg(long, env = "QARK__METRICS__PORT")]
        metrics_port: Option<u16>,

        /// Keep emails in memory instead of sending them
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Fill in the contact form from the terminal and submit it
    Submit {
        /// Site the relay is served from
        #[arg(long, default_value = "http://localhost:4321")]
        site: String,

        /// Request demo access (only the email is required)
        #[arg(long, default_value_t = false)]
        demo: bool,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        message: Option<String>,
    },

    /// Play the placeholder integration widgets
    Showcase,
}

fn init_tracing(default_filter: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
}

fn load_config() -> AppConfig {
    AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            http_port,
            metrics_port,
            dry_run,
        } => {
            init_tracing("qark_site=info,qark_api=info,qark_channels=info,tower_http=info", true);
            serve(host, http_port, metrics_port, dry_run).await
        }
        Commands::Submit {
            site,
            demo,
            name,
            email,
            company,
            message,
        } => {
            init_tracing("warn", false);
            submit(site, demo, name, email, company, message).await
        }
        Commands::Showcase => {
            init_tracing("info", false);
            showcase().await;
            Ok(())
        }
    }
}

async fn serve(
    host: Option<String>,
    http_port: Option<u16>,
    metrics_port: Option<u16>,
    dry_run: bool,
) -> anyhow::Result<()> {
    info!("QArk site relay starting up");

    let mut config = load_config();

    // Apply CLI overrides
    if let Some(host) = host {
        config.api.host = host;
    }
    if let Some(port) = http_port {
        config.api.http_port = port;
    }
    if let Some(port) = metrics_port {
        config.metrics.port = port;
    }

    info!(
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        mail = ?config.mail,
        min_form_time_ms = config.guard.min_form_time_ms,
        "Configuration loaded"
    );

    let provider: Arc<dyn MailProvider> = if dry_run {
        info!("Dry run: emails are recorded, not sent");
        Arc::new(RecordingProvider::new())
    } else {
        Arc::new(ResendProvider::new(&config.mail))
    };

    let api_server = ApiServer::new(config, provider);

    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("QArk site relay is ready to serve traffic");

    // Blocks until shutdown
    api_server.start_http().await?;

    Ok(())
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> anyhow::Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.unwrap_or_default())
}

async fn submit(
    site: String,
    demo: bool,
    name: Option<String>,
    email: Option<String>,
    company: Option<String>,
    message: Option<String>,
) -> anyhow::Result<()> {
    let config = load_config();
    let transport = HttpTransport::for_site(&site).context("invalid --site URL")?;

    // The elapsed-time clock starts when the form is shown, i.e. now.
    let form = ContactForm::new(transport, ConsoleNotifier)
        .with_policy(config.guard)
        .demo(demo);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let name = match name {
        Some(v) => v,
        None if !demo => prompt(&mut lines, "Name").await?,
        None => String::new(),
    };
    let email = match email {
        Some(v) => v,
        None => prompt(&mut lines, "Email").await?,
    };
    let company = match company {
        Some(v) => v,
        None if !demo => prompt(&mut lines, "Company (optional)").await?,
        None => String::new(),
    };
    let message = match message {
        Some(v) => v,
        None if !demo => prompt(&mut lines, "Message").await?,
        None => String::new(),
    };

    form.edit(|f| {
        f.name = name;
        f.email = email;
        f.company = company;
        f.message = message;
    });

    let receipt = form.submit().await?;
    println!("{}", receipt.id);
    Ok(())
}

async fn showcase() {
    let jira = Arc::new(MockJiraConnection::new().on_connect(Arc::new(|| {
        println!("jira: connected callback fired");
    })));
    let connecting = tokio::spawn({
        let jira = jira.clone();
        async move { jira.connect().await }
    });
    while !connecting.is_finished() {
        println!("jira: {:?} {}%", jira.state(), jira.progress());
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    println!("jira: {:?}", jira.state());

    let pipeline = Arc::new(MockPipelineRelaunch::new().on_relaunch(Arc::new(|| {
        println!("pipeline: relaunch callback fired");
    })));
    let relaunching = tokio::spawn({
        let pipeline = pipeline.clone();
        async move { pipeline.relaunch().await }
    });
    while !relaunching.is_finished() {
        println!(
            "pipeline: {:?} toast={}",
            pipeline.state(),
            pipeline.toast_visible()
        );
        tokio::time::sleep(Duration::from_millis(1000)).await;
    }
    println!("pipeline: {:?} (docs at {})", pipeline.state(), pipeline.docs_path());
}
