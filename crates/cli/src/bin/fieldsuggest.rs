use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    fieldsuggest_cli::main_entry().await
}
