use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid item id '{0}': expected '<id>~<type>'")]
    InvalidItemId(String),
    #[error("invalid page number {0}: pages start at 1")]
    InvalidPage(u32),
}
