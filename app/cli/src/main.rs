#[tokio::main]
async fn main() -> anyhow::Result<()> {
    astra_cli_lib::run().await
}
