//! Integration tests for the repositories over the in-memory store.
//!
//! These exercise the cross-document invariants: counters always equal the
//! number of marker documents, and every multi-document write is atomic.

mod common;

use agora_core::{
    Comment, ContentKind, CursorRequest, Message, ReportReason, ReportStatus, ReportTargetKind,
};
use agora_core::Report;
use chrono::Utc;
use common::TestStore;
use futures::future::join_all;

#[tokio::test]
async fn test_concurrent_likes_keep_count_consistent() {
    let t = TestStore::new();
    let author = t.user("author").await;
    let post = t.post(&author, "hello").await;

    let mut likers = Vec::new();
    for i in 0..10 {
        likers.push(t.user(&format!("fan{i}")).await);
    }

    let results = join_all(
        likers
            .iter()
            .map(|uid| t.repos.contents.toggle_like(ContentKind::Post, &post.id, uid)),
    )
    .await;
    assert!(results.iter().all(|r| r.as_ref().is_ok_and(|o| o.active)));

    let stored = t
        .repos
        .contents
        .find_by_id(ContentKind::Post, &post.id)
        .await
        .expect("Query failed")
        .expect("Post not found");
    assert_eq!(stored.like_count, 10);

    let likers_page = t
        .repos
        .contents
        .list_likers(ContentKind::Post, &post.id, &CursorRequest::new(100, None))
        .await
        .expect("Query failed");
    assert_eq!(likers_page.len(), 10);
}

#[tokio::test]
async fn test_feed_sources_follow_graph() {
    let t = TestStore::new();
    let reader = t.user("reader").await;
    let followed = t.user("followed").await;
    let stranger = t.user("stranger").await;

    t.post(&followed, "visible").await;
    t.post(&stranger, "invisible").await;
    t.repos
        .users
        .toggle_follow(&reader, &followed)
        .await
        .expect("Follow failed");

    let authors = t
        .repos
        .users
        .following_ids(&reader, 30)
        .await
        .expect("Query failed");
    assert_eq!(authors, vec![followed.clone()]);

    let feed = t
        .repos
        .contents
        .list_by_authors(ContentKind::Post, &authors, &CursorRequest::first(), None)
        .await
        .expect("Query failed");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed.items[0].text.as_deref(), Some("visible"));
}

#[tokio::test]
async fn test_deleting_post_removes_comments_and_saved_entries() {
    let t = TestStore::new();
    let author = t.user("author").await;
    let fan = t.user("fan").await;
    let post = t.post(&author, "soon gone").await;

    let comment = Comment::new(ContentKind::Post, post.id.clone(), fan.clone(), "first".into());
    t.repos.comments.add(&comment).await.expect("Comment failed");
    t.repos
        .comments
        .toggle_like(ContentKind::Post, &post.id, &comment.id, &author)
        .await
        .expect("Like failed");
    t.repos
        .contents
        .toggle_save(ContentKind::Post, &post.id, &fan)
        .await
        .expect("Save failed");

    t.repos
        .contents
        .delete(ContentKind::Post, &post.id)
        .await
        .expect("Delete failed");

    assert_eq!(t.store.count(&format!("posts/{}/comments", post.id)), 0);
    assert_eq!(
        t.store
            .count(&format!("posts/{}/comments/{}/likes", post.id, comment.id)),
        0
    );
    let saved = t
        .repos
        .users
        .list_saved(&fan, &CursorRequest::first())
        .await
        .expect("Query failed");
    assert!(saved.is_empty());
}

#[tokio::test]
async fn test_conversation_round_trip() {
    let t = TestStore::new();
    let alice = t.user("alice").await;
    let bob = t.user("bob").await;

    let conversation = t
        .repos
        .conversations
        .get_or_create(&alice, &bob)
        .await
        .expect("Create failed");
    for body in ["one", "two", "three"] {
        let message = Message::new(conversation.id.clone(), alice.clone(), Some(body.into()), None);
        t.repos
            .conversations
            .append_message(&message)
            .await
            .expect("Send failed");
    }

    let first = t
        .repos
        .conversations
        .list_messages(&conversation.id, &CursorRequest::new(2, None), None)
        .await
        .expect("Query failed");
    assert_eq!(first.len(), 2);
    assert!(first.has_more());
    let rest = t
        .repos
        .conversations
        .list_messages(&conversation.id, &CursorRequest::new(2, first.next_cursor.clone()), None)
        .await
        .expect("Query failed");
    assert_eq!(rest.len(), 1);

    let inbox = t
        .repos
        .conversations
        .list_summaries(&bob, &CursorRequest::first())
        .await
        .expect("Query failed");
    assert_eq!(inbox.items[0].unread_count, 3);
}

#[tokio::test]
async fn test_report_lifecycle() {
    let t = TestStore::new();
    let reporter = t.user("reporter").await;
    let author = t.user("author").await;
    let post = t.post(&author, "spam spam").await;
    let now = Utc::now();

    let report = Report {
        id: Report::id_for(&reporter, ReportTargetKind::Post, post.id.as_str()),
        reporter_id: reporter.clone(),
        target_kind: ReportTargetKind::Post,
        target_id: post.id.to_string(),
        parent_kind: None,
        parent_id: None,
        reason: ReportReason::Spam,
        details: Some("buy now".into()),
        status: ReportStatus::Open,
        reviewed_by: None,
        created_at: now,
        updated_at: now,
    };
    t.repos.reports.create(&report).await.expect("Report failed");
    assert!(t.repos.reports.create(&report).await.is_err());

    let open = t
        .repos
        .reports
        .list(Some(ReportStatus::Open), &CursorRequest::first())
        .await
        .expect("Query failed");
    assert_eq!(open.len(), 1);

    let moderator = t.user("moderator").await;
    let reviewed = t
        .repos
        .reports
        .update_status(&report.id, ReportStatus::Reviewed, &moderator)
        .await
        .expect("Review failed");
    assert_eq!(reviewed.status, ReportStatus::Reviewed);

    let stored = t
        .repos
        .contents
        .find_by_id(ContentKind::Post, &post.id)
        .await
        .expect("Query failed")
        .expect("Post not found");
    assert_eq!(stored.report_count, 1);
}
