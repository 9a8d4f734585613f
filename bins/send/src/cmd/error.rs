use telelink_api::LinkError;

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("{0}")]
    Link(#[from] LinkError),
}
