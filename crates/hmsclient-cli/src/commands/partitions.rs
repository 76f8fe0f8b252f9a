//! Partition commands.

use anyhow::{Context, Result};
use hmsclient_core::{MetastoreConnection, PartitionDescriptor};

/// Print partition names, at most `limit` of them (-1 for all).
pub async fn list(
    conn: &mut MetastoreConnection,
    database: String,
    table: String,
    limit: i16,
) -> Result<()> {
    let names = conn
        .scoped(move |c| {
            Box::pin(async move { c.get_partition_names(&database, &table, limit).await })
        })
        .await?;

    for name in names {
        println!("{}", name);
    }
    Ok(())
}

/// Add one partition under the table's location.
pub async fn add(
    conn: &mut MetastoreConnection,
    database: String,
    table: String,
    values: Vec<String>,
) -> Result<()> {
    let partition = conn
        .scoped(move |c| {
            Box::pin(async move {
                let descriptor = c.get_table(&database, &table).await?;
                c.add_partition(&descriptor, values.as_slice()).await
            })
        })
        .await?;

    println!("Added partition at {}", partition.sd.location);
    Ok(())
}

/// Print `true` or `false`.
pub async fn exists(
    conn: &mut MetastoreConnection,
    database: String,
    table: String,
    name: String,
) -> Result<()> {
    let found = conn
        .scoped(move |c| {
            Box::pin(async move { c.check_for_named_partition(&database, &table, &name).await })
        })
        .await?;

    println!("{}", found);
    Ok(())
}

/// Drop the named partitions, or all of them.
///
/// With `need_result` the dropped partitions are printed as JSON.
pub async fn drop(
    conn: &mut MetastoreConnection,
    database: String,
    table: String,
    names: Vec<String>,
    all: bool,
    need_result: bool,
) -> Result<()> {
    if !all && names.is_empty() {
        return Err(hmsclient_core::Error::InvalidArgument(
            "give partition names or --all".to_string(),
        )
        .into());
    }

    let requested = need_result_flag(need_result);
    let result = conn
        .scoped(move |c| {
            Box::pin(async move {
                if all {
                    c.drop_all_partitions(&database, &table, requested).await
                } else {
                    c.drop_partitions(&database, &table, names, requested)
                        .await
                }
            })
        })
        .await?;

    match result {
        None => println!("No partitions to drop"),
        Some(result) if need_result => print_partitions(&result.partitions)?,
        Some(_) => println!("Partitions dropped"),
    }
    Ok(())
}

/// Without `--need-result` the server default applies.
fn need_result_flag(need_result: bool) -> Option<bool> {
    need_result.then_some(true)
}

fn print_partitions(partitions: &[PartitionDescriptor]) -> Result<()> {
    let json =
        serde_json::to_string_pretty(partitions).context("Failed to render partitions")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_need_result_flag_leaves_server_default() {
        assert_eq!(need_result_flag(false), None);
        assert_eq!(need_result_flag(true), Some(true));
    }
}
