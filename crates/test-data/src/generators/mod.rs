//! Entity generators for test data.
//!
//! - [`UserGenerator`]: athletes and coaches with profile details
//! - [`CollectibleGenerator`]: collectible items scattered over a region
//! - [`RunGenerator`]: GPS samples along a random-walk route at running pace
//! - [`SocialGenerator`]: coach subscriptions and ratings

pub mod collectible;
pub mod run;
pub mod social;
pub mod user;

pub use collectible::CollectibleGenerator;
pub use run::{GeneratedRun, RunGenerator};
pub use social::{GeneratedSubscription, SocialGenerator};
pub use user::{GeneratedUser, UserGenerator};
