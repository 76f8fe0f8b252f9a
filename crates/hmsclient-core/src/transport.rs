//! The RPC seam between [`MetastoreConnection`](crate::MetastoreConnection)
//! and the Thrift runtime.
//!
//! One trait method corresponds to one remote call. Implementations report
//! remote failures as [`MetastoreError`](crate::MetastoreError) and must not
//! retry.

use crate::model::{
    Database, DropPartitionsRequest, DropPartitionsResult, PartitionDescriptor, TableDescriptor,
};
use crate::Result;
use async_trait::async_trait;

/// Remote Hive Metastore operations used by this client.
#[async_trait]
pub trait MetastoreTransport: Send + Sync {
    /// Open the underlying channel.
    async fn open(&mut self) -> Result<()>;

    /// Close the underlying channel.
    async fn close(&mut self) -> Result<()>;

    async fn get_all_databases(&self) -> Result<Vec<String>>;

    async fn get_database(&self, name: &str) -> Result<Database>;

    async fn get_all_tables(&self, db_name: &str) -> Result<Vec<String>>;

    async fn create_database(&self, database: Database) -> Result<()>;

    async fn drop_database(&self, name: &str, delete_data: bool, cascade: bool) -> Result<()>;

    async fn create_table(&self, table: TableDescriptor) -> Result<()>;

    async fn alter_table(
        &self,
        db_name: &str,
        table_name: &str,
        new_table: TableDescriptor,
    ) -> Result<()>;

    async fn drop_table(&self, db_name: &str, table_name: &str, delete_data: bool) -> Result<()>;

    async fn get_table(&self, db_name: &str, table_name: &str) -> Result<TableDescriptor>;

    async fn add_partition(&self, partition: PartitionDescriptor) -> Result<PartitionDescriptor>;

    /// Returns the number of partitions added.
    async fn add_partitions(&self, partitions: Vec<PartitionDescriptor>) -> Result<i32>;

    async fn get_partitions(
        &self,
        db_name: &str,
        table_name: &str,
        max_parts: i16,
    ) -> Result<Vec<PartitionDescriptor>>;

    async fn get_partition_by_name(
        &self,
        db_name: &str,
        table_name: &str,
        part_name: &str,
    ) -> Result<PartitionDescriptor>;

    async fn drop_partition(
        &self,
        db_name: &str,
        table_name: &str,
        part_vals: Vec<String>,
        delete_data: bool,
    ) -> Result<bool>;

    /// `None` when the service sent no list at all.
    async fn get_partition_names(
        &self,
        db_name: &str,
        table_name: &str,
        max_parts: i16,
    ) -> Result<Option<Vec<String>>>;

    async fn drop_partitions_req(
        &self,
        request: DropPartitionsRequest,
    ) -> Result<DropPartitionsResult>;

    async fn get_current_notification_event_id(&self) -> Result<i64>;
}
