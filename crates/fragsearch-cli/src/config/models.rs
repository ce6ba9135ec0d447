use fragsearch::core::decompose::command::CommandDecomposer;
use fragsearch::engine::config::{SearchConfig, SearchRequest};

pub struct AppConfig {
    pub request: SearchRequest,
    pub search: SearchConfig,
    pub decomposer: CommandDecomposer,
}
