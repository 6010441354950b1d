use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    space_explorer::cli::run().await
}
