//! Curator CLI - label Slack channel messages and train a text categorizer.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use curator::config::{
    parse_user_ids, DEFAULT_BATCH_SIZE, DEFAULT_DATA_FILE, DEFAULT_MODEL_DIR,
    DEFAULT_SLACK_API_URL, ENV_MODEL_DIR, ENV_SLACK_API_URL, ENV_SLACK_IGNORE_USER_IDS,
    ENV_SLACK_TOKEN,
};
use curator::training;
use curator::ui;
use curator::{DialoguerPrompter, Pipeline, PipelineConfig, SlackClient};

/// Curator CLI - Build a text classification dataset from a Slack channel.
#[derive(Parser)]
#[command(name = "curator")]
#[command(about = "Makes it easy to train a model based on messages in a Slack channel")]
#[command(version)]
struct Cli {
    /// The data file to use for storage
    #[arg(short, long, global = true, default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from the classified data file
    Train {
        /// The output directory for the model
        #[arg(short, long, default_value = DEFAULT_MODEL_DIR)]
        output_dir: PathBuf,

        /// Text to use for a test at the end of training
        #[arg(short, long)]
        test_text: Option<String>,
    },

    /// Test a trained model's output
    Test {
        /// The directory for the model
        #[arg(short, long, default_value = DEFAULT_MODEL_DIR)]
        model_dir: PathBuf,

        /// The label expected to be generated with the best score
        #[arg(short, long)]
        expected_label: Option<String>,

        /// Text to test
        #[arg(short, long, conflicts_with = "test_file")]
        test_text: Option<String>,

        /// Tab-separated file with the text first and the expected label second
        #[arg(short = 'f', long)]
        test_file: Option<PathBuf>,
    },

    /// Classify messages from Slack
    Classify {
        /// The Slack channel to pull messages from, with or without the # prefix
        channel: String,

        /// The number of messages to retrieve at a time
        #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Comma-separated user IDs (e.g. W3J13MBJA) whose messages are skipped
        #[arg(short, long, env = ENV_SLACK_IGNORE_USER_IDS)]
        ignore_user_ids: Option<String>,

        /// Error out instead of appending if the data file already exists
        #[arg(short = 'o', long)]
        no_overwrite: bool,

        /// Timestamp to start from instead of the one stored in the data file
        #[arg(short, long)]
        latest_timestamp: Option<String>,

        /// Slack user token (bot tokens lack conversation history access)
        #[arg(short, long, env = ENV_SLACK_TOKEN, hide_env_values = true)]
        token: Option<String>,

        /// Trained model used to preselect label suggestions
        #[arg(short, long, env = ENV_MODEL_DIR)]
        model_dir: Option<PathBuf>,

        /// Slack Web API base URL
        #[arg(long, env = ENV_SLACK_API_URL, default_value = DEFAULT_SLACK_API_URL, hide = true)]
        api_url: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so they stay out of the interactive prompts
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("curator=debug,textcat=debug,info")
        } else {
            EnvFilter::new("curator=warn,textcat=warn,error")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            ui::print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

/// Run the selected command; `Ok(false)` means verification failures.
async fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Train {
            output_dir,
            test_text,
        } => {
            training::train(&cli.data_file, &output_dir, test_text.as_deref())?;
            Ok(true)
        }

        Commands::Test {
            model_dir,
            expected_label,
            test_text,
            test_file,
        } => {
            let cases = training::collect_test_cases(
                test_text.as_deref(),
                expected_label.as_deref(),
                test_file.as_deref(),
            )?;
            let results = training::verify(&model_dir, &cases)?;
            if results.iter().all(textcat::Verification::passed) {
                Ok(true)
            } else {
                ui::print_warning("Encountered verification errors, please see above");
                Ok(false)
            }
        }

        Commands::Classify {
            channel,
            batch_size,
            ignore_user_ids,
            no_overwrite,
            latest_timestamp,
            token,
            model_dir,
            api_url,
        } => {
            let client = SlackClient::with_base_url(token.as_deref(), &api_url)?;
            let generator = textcat::label_generator(model_dir.as_deref());
            let prompter = DialoguerPrompter::default();

            let config = PipelineConfig {
                channel,
                data_file: cli.data_file,
                batch_size,
                ignored_user_ids: parse_user_ids(ignore_user_ids.as_deref()),
                allow_append: !no_overwrite,
                latest_timestamp,
            };
            tracing::info!(
                channel = %config.channel,
                data_file = %config.data_file.display(),
                batch_size,
                suggestions = generator.is_backend_present(),
                "Starting classify"
            );

            let summary = Pipeline::new(config, &client, &prompter, generator.as_ref())
                .run()
                .await?;
            ui::print_info(&format!(
                "{} records saved, snapshot at {}",
                summary.total_records,
                summary.snapshot.display()
            ));
            Ok(true)
        }
    }
}
