mod text;

pub use text::OpenAiEmbedder;
