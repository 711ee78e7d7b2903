use serde_json::json;

use crate::auth::TokenIssuer;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

pub fn handle(config: AppConfig, user_id: i64, output_format: OutputFormat) -> anyhow::Result<()> {
    if user_id <= 0 {
        anyhow::bail!("user id must be positive, got {}", user_id);
    }

    let issuer = TokenIssuer::new(&config.security);
    let token = issuer.issue(user_id)?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "user_id": user_id, "expires_in": issuer.expires_in_secs() })
        ),
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
