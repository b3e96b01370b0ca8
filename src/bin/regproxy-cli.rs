use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Parser)]
#[command(name = "regproxy-cli")]
#[command(about = "Management CLI for regproxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9876")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an upstream (replaces the callback if the name is known)
    Register {
        /// Logical upstream name
        #[arg(short, long)]
        name: String,

        /// Callback URL forwarded requests are issued against
        #[arg(short, long)]
        callback: String,
    },
    /// Send a request through the proxy and print the outcome
    Check {
        /// Path to request, e.g. /health
        #[arg(default_value = "/")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Register { name, callback } => {
            let res = client
                .put(format!("{}/register", cli.url))
                .json(&json!({ "name": name, "callback": callback }))
                .send()
                .await?;

            let status = res.status();
            if status.is_success() {
                println!("registered {} -> {}", name, callback);
            } else {
                eprintln!("Error: proxy returned status {}", status);
                if let Ok(text) = res.text().await {
                    eprintln!("Response: {}", text);
                }
            }
        }
        Commands::Check { path } => {
            let res = client.get(format!("{}{}", cli.url, path)).send().await?;

            let status = res.status();
            println!("status: {}", status);
            if let Ok(text) = res.text().await {
                println!("{}", text);
            }
        }
    }

    Ok(())
}
