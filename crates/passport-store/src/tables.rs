use redb::TableDefinition;

/// Table for storing collector documents.
/// Key: lower-case username
/// Value: serialized CollectorDocument as JSON bytes
pub const COLLECTORS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("collectors");
