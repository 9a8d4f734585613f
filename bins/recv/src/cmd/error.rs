use telelink_api::LinkError;

#[derive(Debug, thiserror::Error)]
pub enum RecvError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("{0}")]
    Link(#[from] LinkError),
}
