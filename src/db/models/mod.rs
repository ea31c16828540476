mod availability;
mod booking;
mod escrow;
mod pricing;
mod profile;
mod wallet;

pub use availability::*;
pub use booking::*;
pub use escrow::*;
pub use pricing::*;
pub use profile::*;
pub use wallet::*;
