use std::path::Path;

use anyhow::Context;
use delivery_commission_core_rs::{
    quote as price_quote, AppConfig, QuoteRequest, RuleSet, SettingsLoader,
};

pub fn quote(config: &AppConfig, distance: f64, order_id: Option<String>) -> anyhow::Result<()> {
    let rules = config
        .load_rule_set()
        .context("failed to load commission rules")?;

    let request = QuoteRequest {
        distance_km: distance,
        order_id,
    };
    let response = price_quote(&request, &rules)?;

    tracing::info!(
        rule_id = %response.rule_id,
        total_payout = response.total_payout,
        resolution = response.resolution.as_str(),
        "Quoted trip payout"
    );
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub fn validate_rules(path: &Path) -> anyhow::Result<()> {
    let rules = RuleSet::from_path(path)
        .with_context(|| format!("invalid rules file {}", path.display()))?;

    let report = serde_json::json!({
        "path": path.display().to_string(),
        "rules": rules.len(),
        "active_rules": rules.active_rules().count(),
        "unbounded_conflicts": rules.unbounded_conflicts(),
        "fingerprint": rules.fingerprint()?,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if rules.active_rules().next().is_none() {
        anyhow::bail!("rules file {} has no active rules", path.display());
    }
    Ok(())
}

pub fn init_settings(config: &AppConfig) -> anyhow::Result<()> {
    let loader = SettingsLoader::new(&config.settings_path);
    let settings = loader.load_or_create()?;
    println!(
        "{} ({} commission rules) at {}",
        settings.business_name,
        settings.rule_set().len(),
        loader.path().display()
    );
    Ok(())
}

pub fn show_settings(config: &AppConfig) -> anyhow::Result<()> {
    let settings = SettingsLoader::new(&config.settings_path).load()?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
