use std::time::Duration;

use anyhow::Result;
use plinth_data::config::{self, NewConfigEntry};
use plinth_test_support::{fixtures, logging};
use tokio::time::sleep;

#[tokio::test]
async fn upsert_inserts_then_replaces_preserving_created_at() -> Result<()> {
    logging::init();
    let dir = fixtures::temp_data_dir()?;
    let pool = config::connect(&dir.path().join("config.db")).await?;

    let entry = NewConfigEntry {
        key: "sleep.delay_ticks",
        value: "100",
        value_type: "long",
        description: "Delay in ticks before checking sleep conditions",
    };
    config::upsert_entry(&pool, &entry).await?;

    let row = config::fetch_entry(&pool, "sleep.delay_ticks")
        .await?
        .expect("inserted row should be fetchable");
    assert_eq!(row.value, "100");
    assert_eq!(row.value_type, "long");
    assert_eq!(
        row.description.as_deref(),
        Some("Delay in ticks before checking sleep conditions")
    );
    let created = row.created_at;

    // CURRENT_TIMESTAMP has one-second resolution; cross the boundary so
    // the trigger-refreshed updated_at is observably newer.
    sleep(Duration::from_millis(1100)).await;

    let replacement = NewConfigEntry {
        key: "sleep.delay_ticks",
        value: "200",
        value_type: "long",
        description: "Delay in ticks before checking sleep conditions",
    };
    config::upsert_entry(&pool, &replacement).await?;

    let row = config::fetch_entry(&pool, "sleep.delay_ticks")
        .await?
        .expect("replaced row should be fetchable");
    assert_eq!(row.value, "200");
    assert_eq!(row.created_at, created);
    assert!(row.updated_at > created);

    pool.close().await;
    Ok(())
}

#[tokio::test]
async fn fetch_all_returns_entries_ordered_by_key() -> Result<()> {
    logging::init();
    let dir = fixtures::temp_data_dir()?;
    let pool = config::connect(&dir.path().join("config.db")).await?;

    for (key, value, value_type) in [
        ("welcome.enabled", "true", "boolean"),
        ("plugin.language", "en", "string"),
        ("sleep.percentage_required", "0.5", "double"),
    ] {
        let entry = NewConfigEntry {
            key,
            value,
            value_type,
            description: "",
        };
        config::upsert_entry(&pool, &entry).await?;
    }

    let rows = config::fetch_all_entries(&pool).await?;
    let keys: Vec<&str> = rows.iter().map(|row| row.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "plugin.language",
            "sleep.percentage_required",
            "welcome.enabled"
        ]
    );

    pool.close().await;
    Ok(())
}

#[tokio::test]
async fn clear_removes_every_entry() -> Result<()> {
    logging::init();
    let dir = fixtures::temp_data_dir()?;
    let pool = config::connect(&dir.path().join("config.db")).await?;

    for key in ["a.one", "a.two", "a.three"] {
        let entry = NewConfigEntry {
            key,
            value: "1",
            value_type: "int",
            description: "",
        };
        config::upsert_entry(&pool, &entry).await?;
    }
    assert_eq!(config::count_entries(&pool).await?, 3);

    config::clear_entries(&pool).await?;
    assert_eq!(config::count_entries(&pool).await?, 0);
    assert!(config::fetch_entry(&pool, "a.one").await?.is_none());

    pool.close().await;
    Ok(())
}

#[tokio::test]
async fn connect_fails_when_the_path_is_unusable() -> Result<()> {
    logging::init();
    let dir = fixtures::temp_data_dir()?;
    // A directory squatting on the database filename makes the open fail.
    let squatter = dir.path().join("config.db");
    tokio::fs::create_dir_all(&squatter).await?;

    let result = config::connect(&squatter).await;
    assert!(result.is_err());
    Ok(())
}
