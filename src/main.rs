use onlyus_launcher::core::error::LauncherResult;

#[tokio::main]
async fn main() -> LauncherResult<()> {
    onlyus_launcher::run().await
}
