
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use time::UtcOffset;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::time::timeout;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unichat::render::{self, Viewport};
use unichat::state::Username;
use unichat::{Applied, ChannelHandle, ChatClient, ClientConfig, ClientError, net};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "unichat", about = "Terminal client for the UniChat room")]
struct Cli {
    /// Chat server endpoint; overrides UNICHAT_URL.
    #[arg(long)]
    url: Option<String>,

    /// Join under this name instead of prompting for one.
    #[arg(long)]
    name: Option<String>,

    /// How many history entries to print after joining.
    #[arg(long, default_value_t = 50)]
    history_height: usize,
}

fn main() -> ExitCode {
    // Read before the runtime starts any worker threads.
    let offset = render::local_offset();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "unichat=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("error: failed to start runtime: {error}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, offset)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, offset: UtcOffset) -> Result<(), ClientError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.url {
        config = config.with_url(url);
    }
    tracing::info!(url = %config.url, "starting unichat");

    let (handle, mut events) = net::connect(&config)?;
    let mut client = ChatClient::new(handle);
    let mut term = Terminal { stdout: tokio::io::stdout(), offset, viewport: Viewport::new(cli.history_height) };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    match cli.name.as_deref() {
        Some(name) => handle_input(&mut client, name, &mut term).await?,
        None => term.prompt().await?,
    }

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("stdin closed");
                    break;
                };
                handle_input(&mut client, &line, &mut term).await?;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    tracing::debug!("transport stopped");
                    return Ok(());
                };
                let applied = client.apply(event);
                term.show(&client, applied).await?;
            }
        }
    }

    // Dropping the handle lets the socket task say goodbye to the server.
    drop(client);
    let drained = timeout(SHUTDOWN_GRACE, async { while events.recv().await.is_some() {} }).await;
    if drained.is_err() {
        tracing::warn!("socket task did not stop in time");
    }
    Ok(())
}

async fn handle_input(client: &mut ChatClient<ChannelHandle>, line: &str, term: &mut Terminal) -> Result<(), ClientError> {
    if !client.session().is_joined() {
        let (reply, ask_again) = join_feedback(client.join(line));
        if let Some(reply) = reply {
            term.line(&reply).await?;
        }
        if ask_again {
            term.prompt().await?;
        }
        return Ok(());
    }

    client.set_draft(line);
    match client.send_draft() {
        Ok(()) | Err(ClientError::EmptyMessage) => Ok(()),
        Err(error) => term.line(&format!("! message not sent: {error}")).await,
    }
}

/// Line to print after a join attempt, and whether to ask for a name again.
fn join_feedback(result: Result<&Username, ClientError>) -> (Option<String>, bool) {
    match result {
        Ok(name) => (Some(format!("Hi {name}")), false),
        Err(ClientError::EmptyUsername) => (None, true),
        Err(error) => (Some(format!("! {error}")), true),
    }
}

struct Terminal {
    stdout: Stdout,
    offset: UtcOffset,
    viewport: Viewport,
}

impl Terminal {
    async fn show(&mut self, client: &ChatClient<ChannelHandle>, applied: Applied) -> Result<(), ClientError> {
        if applied.log_changed() {
            self.viewport.follow(client.log().len());
        }
        match applied {
            Applied::Appended => {
                if let Some(entry) = client.log().last() {
                    let line = render::render_entry(entry, self.offset);
                    self.line(&line).await?;
                }
            }
            Applied::Replaced(_) => {
                for line in render::render_log(client.log(), self.viewport, self.offset) {
                    self.line(&line).await?;
                }
            }
            Applied::Status(status) => self.line(&render::render_status(status)).await?,
            Applied::Ignored => {}
        }
        Ok(())
    }

    async fn prompt(&mut self) -> Result<(), ClientError> {
        self.stdout.write_all(b"Enter your name: ").await?;
        self.stdout.flush().await?;
        Ok(())
    }

    async fn line(&mut self, text: &str) -> Result<(), ClientError> {
        self.stdout.write_all(text.as_bytes()).await?;
        self.stdout.write_all(b"\n").await?;
        self.stdout.flush().await?;
        Ok(())
    }
}
