pub mod cli;
pub mod config;
pub mod context;
pub mod environment;
pub mod error;
pub mod include;
pub mod model;
pub mod parse;
pub mod process;
pub mod project;
pub mod root;
pub mod tags;
pub mod util;

pub use context::ContextQueryService;
pub use error::{Result, TagError};
pub use model::{FileSet, QueryScope, TagRecord};
pub use tags::TagIndex;
