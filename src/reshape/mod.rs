// Reshape module
//
// The matching engine. The walker descends the schema, the searcher looks
// for candidates in the source and the hint resolver decides between
// candidates of the same kind. All of them share one SearchContext per call.

pub use self::config::ReshapeConfig;
pub use self::hints::Hints;
pub use self::walker::Reshaper;

pub mod config;
pub mod context;
pub mod hints;
pub mod search;
pub mod walker;
