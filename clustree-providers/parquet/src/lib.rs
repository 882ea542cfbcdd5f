//! Membership providers that read clustering results from Parquet files and
//! Arrow record batches.

mod errors;
mod ingest;
mod provider;

pub use errors::ParquetProviderError;
pub use provider::ParquetMembershipProvider;

#[cfg(test)]
mod tests;
