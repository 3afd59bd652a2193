use citizens::cli;
use citizens::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    cli::Cli::run().await
}
