#[tokio::main]
async fn main() -> anyhow::Result<()> {
    atelier_workspace::run(std::env::args().skip(1)).await
}
