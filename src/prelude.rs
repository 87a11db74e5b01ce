//! Project-wide exports for easy access.

pub use crate::error::{CompressorError, Result};
pub use crate::settings::*;
pub use crate::util::*;
pub use atomic_float::AtomicF64;
pub use crossbeam_channel::{
    bounded as bounded_channel, Receiver as CCReceiver, Sender as CCSender,
};
