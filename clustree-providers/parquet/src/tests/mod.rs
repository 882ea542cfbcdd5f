pub(crate) use super::{ParquetMembershipProvider, ParquetProviderError};

mod support;
