pub mod ai_client;
pub mod analysis;
pub mod extractor;
pub mod prompts;
pub mod reply_parser;
pub mod skills;
pub mod store;
pub mod token;

pub use ai_client::{CompletionClient, CompletionError, CompletionRequest, OpenAiClient};
pub use analysis::Analyzer;
pub use extractor::{ExtractionResult, TextExtractor};
pub use skills::{match_skills, SKILL_VOCABULARY};
pub use store::{InMemoryStore, MongoStore, RecordStore, StoreError};
pub use token::{Claims, TokenError, TokenService};
