mod availability_repository;
mod booking_repository;
mod profile_repository;
mod wallet_repository;

pub use availability_repository::{AddSlotOutcome, AvailabilityRepository};
pub use booking_repository::{BookingDetail, BookingRepository, ConfirmedBooking};
pub use profile_repository::ProfileRepository;
pub use wallet_repository::{CreditOutcome, WalletRepository};
