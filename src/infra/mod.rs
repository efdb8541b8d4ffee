//! Infrastructure layer - database connection, migrations, repositories
//! and the unit of work that ties them to transactions.

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{NewUser, UserRepository, UserStore};
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, TxUserRepository, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockUserRepository;
