pub mod accumulator;
pub mod completion;
pub mod open_library;
pub mod query_builder;
pub mod recommendation;

// Re-export public types
pub use accumulator::{PageOutcome, PageTicket, ResultAccumulator, SearchSession, SearchState};
pub use completion::{ChatCompletionClient, CompletionCapability};
pub use open_library::{BookSearch, OpenLibraryClient};
pub use query_builder::{build_query, SearchQuery};
pub use recommendation::{validate_description, RecommendationClient};
