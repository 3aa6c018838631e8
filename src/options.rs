use crate::error::{Error, Result};

pub const DEFAULT_BLOCK_SIZE: usize = 4096;

const MIN_BLOCK_SIZE: usize = 64;

/// Validated arena settings. Build with [`ArenaOptionsBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaOptions {
    pub(crate) block_size: usize,
}

impl Default for ArenaOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl ArenaOptions {
    pub fn builder() -> ArenaOptionsBuilder {
        ArenaOptionsBuilder::default()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

#[derive(Debug)]
pub struct ArenaOptionsBuilder {
    block_size: usize,
}

impl Default for ArenaOptionsBuilder {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl ArenaOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of a standard block. Requests larger than a quarter of it get a
    /// block of their own.
    pub fn block_size(&mut self, size: usize) -> &mut Self {
        self.block_size = size;
        self
    }

    pub fn build(&self) -> Result<ArenaOptions> {
        if self.block_size < MIN_BLOCK_SIZE {
            return Err(Error::InvalidOptions(format!(
                "block size {} is smaller than {MIN_BLOCK_SIZE}",
                self.block_size
            )));
        }
        if self.block_size % 8 != 0 {
            return Err(Error::InvalidOptions(format!(
                "block size {} is not a multiple of 8",
                self.block_size
            )));
        }

        Ok(ArenaOptions {
            block_size: self.block_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;

    use super::{ArenaOptions, DEFAULT_BLOCK_SIZE};

    #[test]
    fn test_default_options() {
        let opts = ArenaOptions::builder().build().unwrap();
        assert_eq!(opts, ArenaOptions::default());
        assert_eq!(opts.block_size(), DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn test_invalid_block_size() {
        for size in [0, 8, 63, 100, 4097] {
            let res = ArenaOptions::builder().block_size(size).build();
            assert!(matches!(res, Err(Error::InvalidOptions(_))), "size {size}");
        }

        let opts = ArenaOptions::builder().block_size(256).build().unwrap();
        assert_eq!(opts.block_size(), 256);
    }
}
