pub mod docs;
pub mod markets;
pub mod tvl;
