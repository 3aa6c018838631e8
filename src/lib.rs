mod comparator;
mod mem_allocator;
mod skip_list;

pub mod error;
pub mod options;

#[cfg(test)]
mod test_utils;

pub mod prelude {
    pub use crate::comparator::prelude::*;
    pub use crate::error::{Error, Result};
    pub use crate::mem_allocator::prelude::*;
    pub use crate::options::{ArenaOptions, ArenaOptionsBuilder};
    pub use crate::skip_list::prelude::*;
}
