// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Time operators in one import.
//!
//! ```ignore
//! use freshet_time::prelude::*;
//!
//! let late = source
//!     .skip_for(Duration::from_secs(1), scheduler)
//!     .take_for(Duration::from_secs(5), scheduler);
//! ```

pub use crate::delay_elements::DelayElementsExt;
pub use crate::delay_subscription::DelaySubscriptionExt;
pub use crate::interval::{interval, interval_with_delay};
pub use crate::skip_for::SkipForExt;
pub use crate::take_for::TakeForExt;
