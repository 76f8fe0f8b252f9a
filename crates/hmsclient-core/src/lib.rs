//! hmsclient core - a convenience client for the Hive Metastore
//!
//! This library wraps the generated Hive Metastore Thrift client with:
//!
//! - Compact `name:type` column specs and their tab-delimited rendering
//! - Partition descriptors derived from a table's storage location
//! - Endpoint resolution from arguments, `HMS_HOST` / `HMS_PORT` or defaults
//! - Scoped connections that always close their channel
//! - Batched partition removal

pub mod config;
pub mod connection;
pub mod error;
pub mod model;
pub mod partition;
mod partition_drop;
pub mod schema;
pub mod thrift;
pub mod transport;

// Re-export commonly used types
pub use config::{Config, Endpoint, EnvSource, ProcessEnv};
pub use connection::{ConnectionState, MetastoreConnection, ALL_PARTITIONS};
pub use error::{Error, MetastoreError, Result};
pub use model::{
    Database, DropPartitionsRequest, DropPartitionsResult, FieldSchema, PartitionDescriptor,
    SerDeInfo, StorageDescriptor, TableDescriptor,
};
pub use partition::{make_partition, partition_name};
pub use schema::{make_schema, parse_schema};
pub use thrift::ThriftTransport;
pub use transport::MetastoreTransport;
