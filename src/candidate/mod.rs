//! Detection boxes and overlap pruning.

pub(crate) mod detection;
pub(crate) mod nms;
