//! General-purpose helpers that do not depend on the ECS world.
//!
//! - `random` – uniform sampling and shuffling of slices
//! - `text` – enumeration, placeholder formatting, URL parameter helpers
//! - `weightedpopulation` – weighted random sampling with and without replacement
pub mod random;
pub mod text;
pub mod weightedpopulation;
