//! Closed reference tables: the ISO-3166 country set and the
//! industry/subindustry taxonomy.

pub mod countries;
pub mod industries;

pub use countries::normalize_country;
pub use industries::{normalize_industry, normalize_subindustry};
