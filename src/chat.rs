//! Terminal front end: one question per line, `/quit` or EOF to exit.

use faq_rag::infrastructure::{init_tracing, AppConfig, Pipeline};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(&config.config.log);
    config.log_missing_files();

    let pipeline = Pipeline::bootstrap(config).await?;
    let chat = pipeline.chat.clone();

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(
            format!(
                "{} FAQ entries loaded. Ask a question (/quit to exit).\n> ",
                pipeline.report.store_size()
            )
            .as_bytes(),
        )
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim() == "/quit" {
            break;
        }

        let answer = chat.ask(&line).await;
        stdout.write_all(format!("{answer}\n> ").as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}
