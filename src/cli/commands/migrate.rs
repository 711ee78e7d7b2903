use anyhow::Context;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::schema::migrate;
use crate::database::DatabaseManager;

pub async fn handle(config: AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to open database")?;
    migrate(&db).await.context("failed to apply schema")?;
    db.close().await;

    match output_format {
        OutputFormat::Json => println!("{}", json!({ "success": true, "database": config.database.url })),
        OutputFormat::Text => println!("Schema up to date: {}", config.database.url),
    }
    Ok(())
}
