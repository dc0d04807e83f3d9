use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "minter-cli")]
#[command(about = "Management CLI for the Flutterbye minter", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint a message token and distribute it
    Mint {
        /// Token message (max 27 characters)
        #[arg(short, long)]
        message: String,
        /// Total units to mint
        #[arg(short, long)]
        supply: u64,
        /// Minter wallet; receives the surplus
        #[arg(long)]
        minter: String,
        /// Recipient wallets
        #[arg(short, long = "recipient")]
        recipients: Vec<String>,
    },
    /// Show a token minted by this service
    Token { id: String },
    /// Show a token's metadata document
    Metadata { id: String },
    /// List holders of a token
    Holders { id: String },
    /// Check whether an address is a valid wallet
    Validate { address: String },
    /// Show a wallet's SOL balance
    Balance { address: String },
    /// Show how many units of a token a wallet holds
    TokenBalance { address: String, mint: String },
    /// Check service and ledger health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Mint {
            message,
            supply,
            minter,
            recipients,
        } => {
            client
                .post(format!("{}/tokens", base))
                .json(&json!({
                    "message": message,
                    "totalSupply": supply,
                    "recipientAddresses": recipients,
                    "minterAddress": minter,
                }))
                .send()
                .await?
        }
        Commands::Token { id } => client.get(format!("{}/tokens/{}", base, id)).send().await?,
        Commands::Metadata { id } => {
            client
                .get(format!("{}/tokens/{}/metadata", base, id))
                .send()
                .await?
        }
        Commands::Holders { id } => {
            client
                .get(format!("{}/tokens/{}/holders", base, id))
                .send()
                .await?
        }
        Commands::Validate { address } => {
            client
                .get(format!("{}/wallets/{}/validate", base, address))
                .send()
                .await?
        }
        Commands::Balance { address } => {
            client
                .get(format!("{}/wallets/{}/balance", base, address))
                .send()
                .await?
        }
        Commands::TokenBalance { address, mint } => {
            client
                .get(format!("{}/wallets/{}/tokens/{}", base, address, mint))
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: minter returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
