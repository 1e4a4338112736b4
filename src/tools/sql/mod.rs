mod statement;
pub use statement::*;

mod database;
pub use database::*;

mod list_tables;
pub use list_tables::*;

mod describe_table;
pub use describe_table::*;

mod query_database;
pub use query_database::*;

#[cfg(test)]
pub(crate) mod test_support;
