//! Subcommand implementations.

use std::path::Path;

use anyhow::{Context, bail};
use inboxsorter_core::cache::{export_to_json, import_from_json};
use inboxsorter_core::{
    AddressResolutionCache, CacheStore, JsonRuleSource, RuleStore, SorterConfig, SqliteCacheStore,
    classify,
};
use tracing::warn;

async fn open_store(config: &SorterConfig) -> anyhow::Result<SqliteCacheStore> {
    let db_path = config.db_path.to_string_lossy();
    SqliteCacheStore::new(&db_path)
        .await
        .with_context(|| format!("opening address cache {db_path}"))
}

async fn load_rules(config: &SorterConfig) -> anyhow::Result<RuleStore> {
    let source = JsonRuleSource::new(&config.rules_path);
    let load = RuleStore::load(&source)
        .await
        .with_context(|| format!("loading rules from {}", config.rules_path.display()))?;

    for skipped in &load.skipped {
        warn!(%skipped, "Rule row skipped");
    }
    Ok(load.rules)
}

pub async fn check_rules(config: &SorterConfig) -> anyhow::Result<()> {
    let source = JsonRuleSource::new(&config.rules_path);
    let load = RuleStore::load(&source)
        .await
        .with_context(|| format!("loading rules from {}", config.rules_path.display()))?;

    println!("Sender rules:  {}", load.rules.sender_rule_count());
    println!("Keyword rules: {}", load.rules.keyword_rule_count());
    println!("Skipped rows:  {}", load.skipped.len());
    for skipped in &load.skipped {
        println!("  {skipped}");
    }
    Ok(())
}

/// Map `sender` through the cached address table only.
fn cached_sender<S: CacheStore>(cache: &AddressResolutionCache<S>, sender: &str) -> String {
    cache
        .get(sender)
        .map_or_else(|| sender.to_string(), ToString::to_string)
}

pub async fn classify_message(
    config: &SorterConfig,
    sender: &str,
    subject: &str,
    body: &str,
) -> anyhow::Result<()> {
    let rules = load_rules(config).await?;
    let cache = AddressResolutionCache::load(open_store(config).await?, config.cache_save_interval)
        .await;

    let sender = cached_sender(&cache, sender);
    match classify(&rules, &sender, subject, body) {
        Some(rule) => println!("{}", serde_json::to_string_pretty(&rule)?),
        None => println!("No rule matched"),
    }
    Ok(())
}

pub async fn export_cache(config: &SorterConfig, path: &Path) -> anyhow::Result<()> {
    if !config.db_path.exists() {
        bail!("address cache {} does not exist", config.db_path.display());
    }

    let store = open_store(config).await?;
    let exported = export_to_json(&store, path)
        .await
        .with_context(|| format!("exporting to {}", path.display()))?;

    println!("Exported {exported} entries to {}", path.display());
    Ok(())
}

pub async fn import_cache(config: &SorterConfig, path: &Path) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let imported = import_from_json(&store, path)
        .await
        .with_context(|| format!("importing from {}", path.display()))?;

    println!("Imported {imported} entries into {}", config.db_path.display());
    Ok(())
}

pub async fn cache_stats(config: &SorterConfig) -> anyhow::Result<()> {
    if !config.db_path.exists() {
        println!("{}: not created yet", config.db_path.display());
        return Ok(());
    }

    let store = open_store(config).await?;
    if !store.table_exists().await? {
        println!("{}: no cache table", config.db_path.display());
        return Ok(());
    }

    println!("{}: {} entries", config.db_path.display(), store.count().await?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use inboxsorter_core::CacheEntry;

    use super::*;

    fn config(dir: &Path) -> SorterConfig {
        let mut config = SorterConfig::new(dir.join("rules.json"));
        config.db_path = dir.join("cache.db");
        config
    }

    #[tokio::test]
    async fn test_cached_sender_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let store = open_store(&config).await.unwrap();
        store
            .replace_all(&[CacheEntry::new("/o=corp/cn=a", "a@corp.com")])
            .await
            .unwrap();

        let cache = AddressResolutionCache::load(store, 100).await;

        assert_eq!(cached_sender(&cache, "/O=Corp/CN=A"), "a@corp.com");
        assert_eq!(cached_sender(&cache, "b@x.com"), "b@x.com");
    }

    #[tokio::test]
    async fn test_classify_message_with_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        tokio::fs::write(
            &config.rules_path,
            r#"{ "groups": [ { "name": "Finance", "kind": "keyword",
                               "destination": "Finance", "entries": ["invoice"] } ] }"#,
        )
        .await
        .unwrap();

        classify_message(&config, "b@x.com", "Invoice 7", "")
            .await
            .unwrap();
        check_rules(&config).await.unwrap();
    }

    #[tokio::test]
    async fn test_classify_message_missing_rules_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        assert!(classify_message(&config, "", "", "").await.is_err());
    }

    #[tokio::test]
    async fn test_export_requires_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        let result = export_cache(&config, &dir.path().join("out.json")).await;

        assert!(result.is_err());
        assert!(!config.db_path.exists());
    }

    #[tokio::test]
    async fn test_import_then_export() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        tokio::fs::write(
            &input,
            r#"[
              { "ExchangeAddress": " /O=Corp/CN=B ", "SMTPAddress": "b@corp.com" },
              { "ExchangeAddress": "/o=corp/cn=b", "SMTPAddress": "other@corp.com" },
              { "ExchangeAddress": "/o=corp/cn=a", "SMTPAddress": "a@corp.com" }
            ]"#,
        )
        .await
        .unwrap();

        import_cache(&config, &input).await.unwrap();
        export_cache(&config, &output).await.unwrap();

        let contents = tokio::fs::read_to_string(&output).await.unwrap();
        let exported: Vec<CacheEntry> = serde_json::from_str(&contents).unwrap();
        assert_eq!(
            exported,
            vec![
                CacheEntry::new("/o=corp/cn=a", "a@corp.com"),
                CacheEntry::new("/o=corp/cn=b", "b@corp.com"),
            ]
        );
    }
}
