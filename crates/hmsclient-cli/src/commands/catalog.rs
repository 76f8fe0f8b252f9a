//! Database, table and notification commands.

use anyhow::{Context, Result};
use hmsclient_core::MetastoreConnection;

/// Print every database name, one per line.
pub async fn databases(conn: &mut MetastoreConnection) -> Result<()> {
    let names = conn
        .scoped(|c| Box::pin(async move { c.list_databases().await }))
        .await?;

    for name in names {
        println!("{}", name);
    }
    Ok(())
}

/// Print every table name of `database`, one per line.
pub async fn tables(conn: &mut MetastoreConnection, database: String) -> Result<()> {
    let names = conn
        .scoped(move |c| Box::pin(async move { c.list_tables(&database).await }))
        .await?;

    for name in names {
        println!("{}", name);
    }
    Ok(())
}

/// Print a table definition as pretty JSON.
pub async fn table(conn: &mut MetastoreConnection, database: String, table: String) -> Result<()> {
    let descriptor = conn
        .scoped(move |c| Box::pin(async move { c.get_table(&database, &table).await }))
        .await?;

    let json = serde_json::to_string_pretty(&descriptor).context("Failed to render table")?;
    println!("{}", json);
    Ok(())
}

pub async fn create_database(
    conn: &mut MetastoreConnection,
    name: String,
    comment: Option<String>,
    owner: Option<String>,
) -> Result<()> {
    let created = name.clone();
    conn.scoped(move |c| {
        Box::pin(async move {
            c.create_database(&name, comment.as_deref(), owner.as_deref())
                .await
        })
    })
    .await?;

    println!("Created database {}", created);
    Ok(())
}

pub async fn drop_database(conn: &mut MetastoreConnection, name: String) -> Result<()> {
    let dropped = name.clone();
    conn.scoped(move |c| Box::pin(async move { c.drop_database(&name).await }))
        .await?;

    println!("Dropped database {}", dropped);
    Ok(())
}

pub async fn notification_id(conn: &mut MetastoreConnection) -> Result<()> {
    let id = conn
        .scoped(|c| Box::pin(async move { c.get_current_notification_id().await }))
        .await?;

    println!("{}", id);
    Ok(())
}
