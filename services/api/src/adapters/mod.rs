pub mod suggestions_llm;
pub mod town_info_llm;
pub mod translations;

pub use suggestions_llm::OpenAiSuggestionAdapter;
pub use town_info_llm::OpenAiTownInfoAdapter;
pub use translations::CatalogTranslator;
