use chrono::Utc;
use clap::{Parser, Subcommand};
use relay_core::RelayError;
use relay_lambda::adapters::object_store::{ObjectStore, S3ObjectStore};
use relay_lambda::adapters::queue::{MessageAttributes, MessageQueue, SqsMessageQueue};
use relay_lambda::generator::{generate_message, message_object_key};
use relay_lambda::telemetry::init_tracing;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "relay_cli",
    about = "Generate sample messages for the storage/queue relay"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a message object to the producer's input bucket
    WriteObject {
        /// Input bucket watched by the producer
        bucket: String,
        /// Message text; a random sentence is used when omitted
        #[arg(long)]
        text: Option<String>,
    },
    /// Send a message straight to the relay queue
    SendMessage {
        /// Queue URL drained by the consumer
        #[arg(env = "RELAY_QUEUE_URL")]
        queue_url: String,
        /// Message text; a random sentence is used when omitted
        #[arg(long)]
        text: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), RelayError> {
    init_tracing();
    let cli = Cli::parse();
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let mut rng = rand::thread_rng();

    match cli.command {
        Commands::WriteObject { bucket, text } => {
            let message = generate_message(text, Utc::now(), &mut rng);
            let key = message_object_key(&message);
            S3ObjectStore::new(&aws_config).write_object(
                &bucket,
                &key,
                message.to_json()?.as_bytes(),
            )?;
            info!(bucket = %bucket, key = %key, text = %message.text, "wrote message object");
        }
        Commands::SendMessage { queue_url, text } => {
            let message = generate_message(text, Utc::now(), &mut rng);
            SqsMessageQueue::new(&aws_config).send_message(
                &queue_url,
                &message.to_json()?,
                &MessageAttributes::new(),
            )?;
            info!(queue_url = %queue_url, text = %message.text, "sent message");
        }
    }

    Ok(())
}
