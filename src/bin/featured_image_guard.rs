//! Featured Image Guard CLI - Bridge interface for host applications
//!
//! Commands: policies, evaluate, notice
//! Outputs JSON to stdout
//! Returns 2 when publishing would be denied

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use featured_image_guard::{
    AdminNotice, ImageMetadata, PolicyTable, PublicationGuard, RejectionReason,
};

#[derive(Parser)]
#[command(name = "featured-image-guard")]
#[command(about = "Featured Image Guard - publication gate for featured images", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the policy file (JSON object keyed by post type)
    #[arg(short, long, default_value = "policies.json")]
    policies: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List forced post types and their policies
    Policies,

    /// Evaluate whether a post may be published
    Evaluate {
        /// Post type
        #[arg(short = 't', long)]
        post_type: String,

        /// JSON image metadata; omit when the post has no featured image
        #[arg(short, long)]
        image: Option<String>,
    },

    /// Render the editor notice for a rejection reason
    Notice {
        /// Post type
        #[arg(short = 't', long)]
        post_type: String,

        /// Reason code (no-image, wrong-size)
        #[arg(short, long)]
        reason: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let table = match PolicyTable::load_from_file(&cli.policies) {
        Ok(t) => t,
        Err(e) => {
            print_json(&serde_json::json!({ "error": e.to_string() }));
            return ExitCode::FAILURE;
        }
    };

    let guard = PublicationGuard::new(table);

    match cli.command {
        Commands::Policies => {
            let policies: serde_json::Map<_, _> = guard
                .policies()
                .list()
                .into_iter()
                .map(|(post_type, policy)| {
                    (post_type.to_string(), serde_json::to_value(policy).unwrap_or_default())
                })
                .collect();

            print_json(&serde_json::Value::Object(policies));
            ExitCode::SUCCESS
        }

        Commands::Evaluate { post_type, image } => {
            let image: Option<ImageMetadata> = match image.as_deref().map(serde_json::from_str::<ImageMetadata>).transpose() {
                Ok(i) => i,
                Err(e) => {
                    print_json(&serde_json::json!({ "error": format!("Invalid image metadata: {e}") }));
                    return ExitCode::FAILURE;
                }
            };

            let result = guard.evaluate(&post_type, image.as_ref());
            print_json(&result);
            if result.is_allowed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2) // Publish denied
            }
        }

        Commands::Notice { post_type, reason } => {
            let Some(reason) = RejectionReason::from_code(&reason) else {
                print_json(&serde_json::json!({ "error": format!("Unknown reason code: {reason}") }));
                return ExitCode::FAILURE;
            };

            let notice = AdminNotice::new(reason, guard.policies().get(&post_type));
            print_json(&serde_json::json!({
                "reason": notice.reason,
                "summary": notice.summary,
                "html": notice.to_html(),
            }));
            ExitCode::SUCCESS
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("failed to serialize output: {e}"),
    }
}
