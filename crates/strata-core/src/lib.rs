pub mod config;
pub mod error;
pub mod io;
pub mod lister;
pub mod loader;
pub mod merge;
pub mod paths;
pub mod resolver;
pub mod similarity;
pub mod types;

pub use error::{PatternError, PatternNotFound, Result, YamlSyntaxError};
pub use lister::{list_patterns, ListOptions, PatternListing, PatternSelector, PatternSummary};
pub use loader::{discover, load_one, Discovery};
pub use merge::{merge, merge_as, ResolvedConfig};
pub use resolver::Resolver;
pub use types::{Origin, PatternDescriptor, PatternType, SearchPath};
