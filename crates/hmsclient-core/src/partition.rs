//! Partition descriptors derived from table metadata.

use crate::model::{FieldSchema, PartitionDescriptor, TableDescriptor};
use crate::{Error, Result};

/// Render the `key1=v1/key2=v2` partition name.
///
/// Keys and values are paired by position. The two slices must have the same
/// length.
pub fn partition_name<S: AsRef<str>>(keys: &[FieldSchema], values: &[S]) -> Result<String> {
    if keys.len() != values.len() {
        return Err(Error::InvalidArgument(format!(
            "Partition values do not match table schema: {} keys, {} values",
            keys.len(),
            values.len()
        )));
    }

    let segments: Vec<String> = keys
        .iter()
        .zip(values)
        .map(|(key, value)| format!("{}={}", key.name, value.as_ref()))
        .collect();

    Ok(segments.join("/"))
}

/// Build the partition of `table` identified by `values`.
///
/// The partition's storage descriptor is a copy of the table's with
/// `/key1=v1/key2=v2` appended to the location. `table` is left untouched.
pub fn make_partition<S: AsRef<str>>(
    table: &TableDescriptor,
    values: &[S],
) -> Result<PartitionDescriptor> {
    let name = partition_name(&table.partition_keys, values)?;

    let mut sd = table.sd.clone();
    sd.location = format!("{}/{}", sd.location, name);

    Ok(PartitionDescriptor {
        values: values.iter().map(|v| v.as_ref().to_string()).collect(),
        db_name: table.db_name.clone(),
        table_name: table.table_name.clone(),
        sd,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StorageDescriptor;

    fn events_table() -> TableDescriptor {
        TableDescriptor {
            db_name: "analytics".into(),
            table_name: "events".into(),
            partition_keys: vec![FieldSchema::new("ds", "string"), FieldSchema::new("hr", "int")],
            sd: StorageDescriptor::text(
                "hdfs://nn/warehouse/analytics.db/events",
                vec![FieldSchema::new("id", "bigint")],
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_make_partition_location() {
        let table = events_table();
        let partition = make_partition(&table, &["2024-01-01", "07"]).unwrap();

        assert_eq!(
            partition.sd.location,
            "hdfs://nn/warehouse/analytics.db/events/ds=2024-01-01/hr=07"
        );
        assert_eq!(partition.values, vec!["2024-01-01", "07"]);
        assert_eq!(partition.db_name, "analytics");
        assert_eq!(partition.table_name, "events");
        // Everything but the location is carried over from the table
        assert_eq!(partition.sd.cols, table.sd.cols);
        assert_eq!(partition.sd.input_format, table.sd.input_format);
    }

    #[test]
    fn test_make_partition_copies_full_storage_descriptor() {
        let mut table = events_table();
        table.sd.num_buckets = Some(16);
        table.sd.bucket_cols = vec!["id".into()];
        table.sd.unmodeled = Some(Box::new(hive_metastore::StorageDescriptor {
            stored_as_sub_directories: Some(true),
            ..Default::default()
        }));

        let partition = make_partition(&table, &["2024-01-01", "07"]).unwrap();

        assert_eq!(partition.sd.num_buckets, Some(16));
        assert_eq!(partition.sd.bucket_cols, vec!["id"]);
        assert_eq!(partition.sd.unmodeled, table.sd.unmodeled);
        assert_ne!(partition.sd.location, table.sd.location);
    }

    #[test]
    fn test_make_partition_leaves_table_untouched() {
        let table = events_table();
        let before = table.clone();

        make_partition(&table, &["2024-01-01", "07"]).unwrap();
        assert_eq!(table, before);
        assert_eq!(table.sd.location, "hdfs://nn/warehouse/analytics.db/events");
    }

    #[test]
    fn test_make_partition_arity_mismatch() {
        let table = events_table();
        let before = table.clone();

        let err = make_partition(&table, &["2024-01-01"]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = make_partition(&table, &["a", "b", "c"]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        assert_eq!(table, before);
    }

    #[test]
    fn test_pairing_is_positional() {
        // Values named like keys are still paired by position
        let table = events_table();
        let partition = make_partition(&table, &["hr", "ds"]).unwrap();
        assert!(partition.sd.location.ends_with("/ds=hr/hr=ds"));
    }

    #[test]
    fn test_partition_name() {
        let keys = vec![FieldSchema::new("year", "int"), FieldSchema::new("month", "int")];
        let values = vec!["2024".to_string(), "02".to_string()];
        assert_eq!(partition_name(&keys, &values).unwrap(), "year=2024/month=02");
        assert!(partition_name(&keys, &values[..1]).is_err());
    }
}
