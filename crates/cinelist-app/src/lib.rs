// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod filter;
pub mod ids;
pub mod model;
pub mod source;
pub mod state;

pub use filter::*;
pub use ids::*;
pub use model::*;
pub use source::*;
pub use state::*;
