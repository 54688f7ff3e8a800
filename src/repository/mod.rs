//! Contract for the external account store.
//!
//! The identity core never owns account rows; it reads and writes them
//! through [`AccountRepository`]. Uniqueness of usernames and emails is the
//! store's job.
//!
//! Enable the `mocks` feature for [`MockAccountRepository`], an in-memory
//! implementation for tests.

mod account;

#[cfg(any(test, feature = "mocks"))]
mod account_mock;

pub use account::{Account, AccountRepository, DEFAULT_ROLE, NewAccount};

#[cfg(any(test, feature = "mocks"))]
pub use account_mock::MockAccountRepository;
