use anyhow::Context;
use legally_config::LegallyConfig;

/// Load `.env` (current directory first, then the project's `.legally/.env`)
/// and resolve the layered configuration.
pub fn load_config() -> anyhow::Result<LegallyConfig> {
    load_dotenv()?;
    LegallyConfig::load().context("failed to load legally configuration")
}

fn load_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;

    let local = cwd.join(".env");
    if local.exists() {
        dotenvy::from_path(&local)
            .with_context(|| format!("failed to load dotenv file at {}", local.display()))?;
        return Ok(());
    }

    let project = cwd.join(".legally").join(".env");
    if project.exists() {
        dotenvy::from_path(&project)
            .with_context(|| format!("failed to load dotenv file at {}", project.display()))?;
    }
    Ok(())
}
