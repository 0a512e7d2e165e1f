pub mod band;
pub mod content;
pub mod extraction;
pub mod tag;
pub mod tenant;
