//! Users, settings and questions.
//!
//! - [`domain`]: row shapes, the seed plan and generator, and the storage seam
//! - [`bench`]: the two read strategies and the timing runner
//! - [`infra`]: `SeaORM` entities, migrations and the `SeedStore` implementation

pub mod bench;
pub mod domain;
pub mod infra;

pub use bench::{BenchConfig, BenchError, BenchReport, BenchRunner, BenchTarget, QueryStrategy};
pub use domain::error::SeedError;
pub use domain::model::{Question, Visibility};
pub use domain::plan::{SeedPlan, TOTAL_USERS, USER_BATCH_SIZE};
pub use domain::random::{RandomSource, RngSource};
pub use domain::repo::{SeedStore, SeedTable};
pub use domain::service::{SeedService, SeedSummary};
pub use infra::storage::SeaOrmSeedStore;
pub use infra::storage::migrations::Migrator;
