use clap::{Parser, Subcommand};
use pollbus_client::{BusClient, ClientConfig};
use pollbus_core::Cursor;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pollbus-chat")]
#[command(about = "Talk to a pollbus server from the terminal")]
struct Cli {
    /// Bus endpoint
    #[arg(long, default_value = pollbus_client::config::DEFAULT_ENDPOINT)]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Post a message
    Send {
        #[arg(short, long)]
        user: String,
        /// Message text
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Print messages as they arrive
    Listen {
        /// Resume after this token instead of replaying the history
        #[arg(long)]
        from: Option<Cursor>,
    },
    /// Print every stored record
    Dump,
    /// Wipe the log
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = BusClient::new(ClientConfig::new(&cli.url)?)?;

    match cli.command {
        Command::Send { user, text } => {
            client.post(&text.join(" "), &user).await?;
        }
        Command::Listen { from } => {
            let messages = client.subscribe(from.unwrap_or_default());
            while let Ok(message) = messages.recv().await {
                let message = message?;
                println!("[{}] {}: {}", message.t, message.u, message.m);
            }
        }
        Command::Dump => {
            let messages = client.dump().await?;
            println!("{}", serde_json::to_string_pretty(&messages)?);
        }
        Command::Clear => {
            client.clear().await?;
        }
    }

    Ok(())
}
