//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use agora_core::{Content, ContentKind, UserId, UserProfile};
use agora_repository::{InMemoryDocumentStore, Repositories};
use std::sync::Arc;

/// A fresh store with every repository wired over it.
pub struct TestStore {
    pub store: Arc<InMemoryDocumentStore>,
    pub repos: Repositories,
}

impl TestStore {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        let repos = Repositories::new(store.clone());
        Self { store, repos }
    }

    /// Creates a profile whose uid and username are both `name`.
    pub async fn user(&self, name: &str) -> UserId {
        let id = UserId::new(name);
        self.repos
            .users
            .create(&UserProfile::new(
                id.clone(),
                name,
                name,
                &format!("{name}@example.com"),
            ))
            .await
            .expect("Failed to create profile");
        id
    }

    /// Publishes a text post by `author`.
    pub async fn post(&self, author: &UserId, text: &str) -> Content {
        let mut post = Content::new(ContentKind::Post, author.clone());
        post.text = Some(text.to_string());
        self.repos
            .contents
            .create(&post)
            .await
            .expect("Failed to create post");
        post
    }
}
