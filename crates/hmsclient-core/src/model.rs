//! Metastore value types.
//!
//! These name the parts of the Hive Metastore Thrift structures that this
//! client reads and writes. Conversion to and from the generated types lives
//! in [`crate::thrift`].
//!
//! Generated fields without a counterpart here are kept in an `unmodeled`
//! remainder, so an object fetched from the metastore and written back (or
//! copied into a partition) loses nothing. The remainder is not serialized.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serde library for delimited text tables.
pub const SIMPLE_SERDE: &str = "org.apache.hadoop.hive.serde2.lazy.LazySimpleSerDe";

/// Input format for delimited text tables.
pub const INPUT_FORMAT: &str = "org.apache.hadoop.mapred.TextInputFormat";

/// Output format for delimited text tables.
pub const OUTPUT_FORMAT: &str = "org.apache.hadoop.hive.ql.io.HiveIgnoreKeyTextOutputFormat";

/// Column type used when a compact spec does not name one.
pub const DEFAULT_COLUMN_TYPE: &str = "string";

/// A column: name, Hive type string and comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub comment: String,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            comment: String::new(),
        }
    }
}

/// Serializer/deserializer settings of a storage descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerDeInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub serialization_lib: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    #[serde(skip)]
    pub unmodeled: Option<Box<hive_metastore::SerDeInfo>>,
}

/// Physical layout of a table or partition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageDescriptor {
    /// Filesystem or object-store path of the data
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub cols: Vec<FieldSchema>,
    #[serde(default)]
    pub input_format: Option<String>,
    #[serde(default)]
    pub output_format: Option<String>,
    #[serde(default)]
    pub compressed: Option<bool>,
    /// Bucket count, -1 when the data is not bucketed
    #[serde(default)]
    pub num_buckets: Option<i32>,
    #[serde(default)]
    pub bucket_cols: Vec<String>,
    #[serde(default)]
    pub serde_info: Option<SerDeInfo>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Sort columns, skew information and the like
    #[serde(skip)]
    pub unmodeled: Option<Box<hive_metastore::StorageDescriptor>>,
}

impl StorageDescriptor {
    /// Descriptor for a delimited text table stored at `location`.
    pub fn text(location: impl Into<String>, cols: Vec<FieldSchema>) -> Self {
        Self {
            location: location.into(),
            cols,
            input_format: Some(INPUT_FORMAT.to_string()),
            output_format: Some(OUTPUT_FORMAT.to_string()),
            compressed: Some(false),
            num_buckets: Some(-1),
            serde_info: Some(SerDeInfo {
                serialization_lib: Some(SIMPLE_SERDE.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// A metastore database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location_uri: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

/// A metastore table definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub db_name: String,
    pub table_name: String,
    #[serde(default)]
    pub owner: Option<String>,
    /// Partition columns, in partition order
    #[serde(default)]
    pub partition_keys: Vec<FieldSchema>,
    #[serde(default)]
    pub sd: StorageDescriptor,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// `MANAGED_TABLE`, `EXTERNAL_TABLE`, ...
    #[serde(default)]
    pub table_type: Option<String>,
    /// Seconds since the epoch
    #[serde(default)]
    pub create_time: Option<i32>,
    #[serde(default)]
    pub last_access_time: Option<i32>,
    #[serde(default)]
    pub retention: Option<i32>,
    /// View definition as written, for `VIRTUAL_VIEW` tables
    #[serde(default)]
    pub view_original_text: Option<String>,
    #[serde(default)]
    pub view_expanded_text: Option<String>,
    /// Privileges, temporary flag, catalog name and the like
    #[serde(skip)]
    pub unmodeled: Option<Box<hive_metastore::Table>>,
}

/// A single partition of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionDescriptor {
    /// Partition values, positionally matching the table's partition keys
    pub values: Vec<String>,
    pub db_name: String,
    pub table_name: String,
    #[serde(default)]
    pub sd: StorageDescriptor,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub create_time: Option<i32>,
    #[serde(default)]
    pub last_access_time: Option<i32>,
    #[serde(skip)]
    pub unmodeled: Option<Box<hive_metastore::Partition>>,
}

/// Batched partition removal by partition name.
///
/// Optional flags left as `None` take the server-side default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropPartitionsRequest {
    pub db_name: String,
    pub table_name: String,
    /// Partition names such as `ds=2024-01-01/hr=00`
    pub names: Vec<String>,
    #[serde(default)]
    pub delete_data: Option<bool>,
    #[serde(default)]
    pub if_exists: Option<bool>,
    #[serde(default)]
    pub need_result: Option<bool>,
}

impl DropPartitionsRequest {
    /// Request dropping the named partitions.
    pub fn by_names(
        db_name: impl Into<String>,
        table_name: impl Into<String>,
        names: Vec<String>,
        need_result: Option<bool>,
    ) -> Self {
        Self {
            db_name: db_name.into(),
            table_name: table_name.into(),
            names,
            delete_data: None,
            if_exists: None,
            need_result,
        }
    }
}

/// Result of a batched partition removal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DropPartitionsResult {
    /// Dropped partitions, populated only when the request asked for a result
    #[serde(default)]
    pub partitions: Vec<PartitionDescriptor>,
}
