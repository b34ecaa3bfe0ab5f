pub mod article;
pub mod tag;

pub use article::{Article, ArticleForm, ArticleUpdateForm};
pub use tag::Tag;
