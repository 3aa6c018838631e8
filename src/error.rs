use std::alloc::LayoutError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Out of memory: cannot allocate {size} bytes aligned to {align}")]
    OutOfMemory { size: usize, align: usize },

    #[error("Layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reports an allocation failure and never returns. Running out of arena
/// memory is not recoverable.
pub(crate) fn alloc_failed(err: Error) -> ! {
    tracing::error!("{}", err);
    if let Error::OutOfMemory { size, align } = err {
        if let Ok(layout) = std::alloc::Layout::from_size_align(size, align) {
            std::alloc::handle_alloc_error(layout);
        }
    }
    panic!("{err}");
}
