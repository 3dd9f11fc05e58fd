mod common;

use chat_search::migrate;
use chat_search::sqlite_store::SqliteStore;
use chat_search_core::store::memory::InMemoryStore;
use chat_search_core::{
    ChatStore, ConversationHit, HybridSearchResolver, MatchType, OwnerId, ResolverOptions,
    SearchError,
};

use common::{conversation, day, doc_ref, message, seeded_store};

fn owner(id: &str) -> OwnerId {
    OwnerId::new(id).unwrap()
}

fn summary(hits: &[ConversationHit]) -> Vec<(String, Option<MatchType>)> {
    hits.iter()
        .map(|h| (h.conversation.id.clone(), h.match_type))
        .collect()
}

fn hit(id: &str, match_type: MatchType) -> (String, Option<MatchType>) {
    (id.to_string(), Some(match_type))
}

#[tokio::test]
async fn test_title_and_message_matches_are_annotated() {
    let (_tmp, store) = seeded_store().await;
    let resolver = HybridSearchResolver::new(store);

    let hits = resolver.search(&owner("u1"), "budget").await.unwrap();
    assert_eq!(
        summary(&hits),
        vec![
            hit("c3", MatchType::Both),
            hit("c2", MatchType::Message),
            hit("c1", MatchType::Title),
        ]
    );
}

#[tokio::test]
async fn test_document_reference_match() {
    let (_tmp, store) = seeded_store().await;
    let resolver = HybridSearchResolver::new(store);

    let hits = resolver.search(&owner("u1"), "expense").await.unwrap();
    assert_eq!(summary(&hits), vec![hit("c4", MatchType::Document)]);
}

#[tokio::test]
async fn test_matching_is_stemmed_and_case_insensitive() {
    let (_tmp, store) = seeded_store().await;
    let resolver = HybridSearchResolver::new(store);

    let plural = resolver.search(&owner("u1"), "BUDGETS").await.unwrap();
    assert_eq!(plural.len(), 3);

    let expenses = resolver.search(&owner("u1"), "Expenses").await.unwrap();
    assert_eq!(summary(&expenses), vec![hit("c4", MatchType::Document)]);
}

#[tokio::test]
async fn test_every_term_must_match() {
    let (_tmp, store) = seeded_store().await;
    let resolver = HybridSearchResolver::new(store);

    let hits = resolver.search(&owner("u1"), "budget review").await.unwrap();
    assert_eq!(summary(&hits), vec![hit("c1", MatchType::Title)]);
}

#[tokio::test]
async fn test_document_content_is_searched() {
    let (_tmp, store) = seeded_store().await;
    let resolver = HybridSearchResolver::new(store);

    // "travel" is c5's title and part of d1's content, which c4 references.
    let hits = resolver.search(&owner("u1"), "travel").await.unwrap();
    assert_eq!(
        summary(&hits),
        vec![hit("c5", MatchType::Title), hit("c4", MatchType::Document)]
    );
}

#[tokio::test]
async fn test_direct_match_wins_over_document_reference() {
    let (_tmp, store) = seeded_store().await;
    store
        .upsert_conversation(&conversation("c6", "u1", "Expense follow-up", day(8)))
        .await
        .unwrap();
    store
        .upsert_message(&message("m8", "c6", doc_ref("d1")))
        .await
        .unwrap();
    let resolver = HybridSearchResolver::new(store);

    let hits = resolver.search(&owner("u1"), "expense").await.unwrap();
    assert_eq!(
        summary(&hits),
        vec![hit("c6", MatchType::Title), hit("c4", MatchType::Document)]
    );
}

#[tokio::test]
async fn test_empty_query_lists_all_without_annotation() {
    let (_tmp, store) = seeded_store().await;
    let resolver = HybridSearchResolver::new(store);

    for query in ["", "   ", "\t\n"] {
        let hits = resolver.search(&owner("u1"), query).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.conversation.id.as_str()).collect();
        assert_eq!(ids, vec!["c5", "c4", "c3", "c2", "c1"]);
        assert!(hits.iter().all(|h| h.match_type.is_none()));
    }
}

#[tokio::test]
async fn test_other_owners_never_leak() {
    let (_tmp, store) = seeded_store().await;
    let resolver = HybridSearchResolver::new(store);

    // x2 references u1's d1 but belongs to u2.
    let u1 = resolver.search(&owner("u1"), "expense").await.unwrap();
    assert!(u1.iter().all(|h| h.conversation.owner_id == "u1"));

    // u2 owns d2 ("Expense Report") but nothing references it, and d1 is
    // not u2's document.
    let u2 = resolver.search(&owner("u2"), "expense").await.unwrap();
    assert!(u2.is_empty());

    let u2_budget = resolver.search(&owner("u2"), "budget").await.unwrap();
    assert_eq!(summary(&u2_budget), vec![hit("x1", MatchType::Both)]);
}

#[tokio::test]
async fn test_unknown_owner_gets_nothing() {
    let (_tmp, store) = seeded_store().await;
    let resolver = HybridSearchResolver::new(store);

    assert!(resolver.search(&owner("nobody"), "budget").await.unwrap().is_empty());
    assert!(resolver.search(&owner("nobody"), "").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_query_without_terms_matches_nothing() {
    let (_tmp, store) = seeded_store().await;
    let resolver = HybridSearchResolver::new(store);

    let hits = resolver.search(&owner("u1"), "\"!!! ***").await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_fts_syntax_in_query_is_literal() {
    let (_tmp, store) = seeded_store().await;
    let resolver = HybridSearchResolver::new(store);

    // Operators and quotes must not reach FTS5 as syntax.
    let hits = resolver
        .search(&owner("u1"), "budget\" -notes*")
        .await
        .unwrap();
    assert_eq!(summary(&hits), vec![hit("c3", MatchType::Title)]);
}

#[tokio::test]
async fn test_sequential_discovery_gives_same_results() {
    let (_tmp, store) = seeded_store().await;
    let resolver = HybridSearchResolver::with_options(
        store,
        ResolverOptions {
            concurrent_discovery: false,
        },
    );

    let hits = resolver.search(&owner("u1"), "travel").await.unwrap();
    assert_eq!(
        summary(&hits),
        vec![hit("c5", MatchType::Title), hit("c4", MatchType::Document)]
    );
}

#[tokio::test]
async fn test_equal_timestamps_keep_insertion_order() {
    let (_tmp, pool) = common::empty_pool().await;
    let store = SqliteStore::new(pool);
    for id in ["t1", "t2", "t3"] {
        store
            .upsert_conversation(&conversation(id, "u1", "Standup", day(9)))
            .await
            .unwrap();
    }
    let resolver = HybridSearchResolver::new(store);

    let hits = resolver.search(&owner("u1"), "standup").await.unwrap();
    let ids: Vec<&str> = hits.iter().map(|h| h.conversation.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2", "t3"]);

    let listed = resolver.search(&owner("u1"), "").await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|h| h.conversation.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2", "t3"]);
}

#[tokio::test]
async fn test_upsert_replaces_projection() {
    let (_tmp, store) = seeded_store().await;
    store
        .upsert_conversation(&conversation("c1", "u1", "Retrospective", day(1)))
        .await
        .unwrap();
    let resolver = HybridSearchResolver::new(store);

    let budget = resolver.search(&owner("u1"), "budget").await.unwrap();
    assert!(budget.iter().all(|h| h.conversation.id != "c1"));

    let retro = resolver.search(&owner("u1"), "retrospective").await.unwrap();
    assert_eq!(summary(&retro), vec![hit("c1", MatchType::Title)]);
}

#[tokio::test]
async fn test_store_passes_directly() {
    let (_tmp, store) = seeded_store().await;
    let u1 = owner("u1");

    let rows = store
        .find_conversations_by_title_or_message(&u1, "budget")
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    let c3 = rows.iter().find(|r| r.conversation.id == "c3").unwrap();
    assert!(c3.title_matched && c3.message_matched);

    let docs = store.find_documents_by_text(&u1, "report").await.unwrap();
    assert_eq!(docs, vec!["d1".to_string()]);

    let referencing = store
        .find_conversations_referencing_documents(&u1, &docs)
        .await
        .unwrap();
    let ids: Vec<&str> = referencing.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c4"]);

    assert!(store
        .find_conversations_referencing_documents(&u1, &[])
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let (_tmp, store) = seeded_store().await;
    migrate::run_migrations(store.pool()).await.unwrap();
    migrate::run_migrations(store.pool()).await.unwrap();

    let resolver = HybridSearchResolver::new(store);
    let hits = resolver.search(&owner("u1"), "budget").await.unwrap();
    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn test_unmigrated_database_is_store_unavailable() {
    let tmp = tempfile::TempDir::new().unwrap();
    let pool = chat_search::db::connect_path(&tmp.path().join("bare.sqlite"), 1)
        .await
        .unwrap();
    let resolver = HybridSearchResolver::new(SqliteStore::new(pool));

    let err = resolver.search(&owner("u1"), "budget").await.unwrap_err();
    assert!(matches!(err, SearchError::StoreUnavailable(_)));

    let err = resolver.search(&owner("u1"), "").await.unwrap_err();
    assert!(matches!(err, SearchError::StoreUnavailable(_)));
}

#[tokio::test]
async fn test_concurrent_searches_share_one_resolver() {
    let (_tmp, store) = seeded_store().await;
    let resolver = std::sync::Arc::new(HybridSearchResolver::new(store));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let resolver = resolver.clone();
        handles.push(tokio::spawn(async move {
            resolver.search(&owner("u1"), "budget").await
        }));
    }
    for handle in handles {
        let hits = handle.await.unwrap().unwrap();
        assert_eq!(hits.len(), 3);
    }
}

#[tokio::test]
async fn test_attachment_structure_is_not_message_text() {
    let (_tmp, pool) = common::empty_pool().await;
    let store = SqliteStore::new(pool);
    store
        .upsert_conversation(&conversation("c4", "u1", "Monthly sync", day(4)))
        .await
        .unwrap();
    store
        .upsert_message(&message("m4", "c4", doc_ref("doc-expense-2024")))
        .await
        .unwrap();
    store
        .upsert_document(&common::document(
            "doc-expense-2024",
            "u1",
            "Expense Report",
            "travel and meals",
        ))
        .await
        .unwrap();
    let resolver = HybridSearchResolver::new(store);

    // The id contains "expense", but only the document makes c4 a hit.
    let hits = resolver.search(&owner("u1"), "expense").await.unwrap();
    assert_eq!(summary(&hits), vec![hit("c4", MatchType::Document)]);

    for query in ["document", "type", "documentid", "text"] {
        let hits = resolver.search(&owner("u1"), query).await.unwrap();
        assert!(hits.is_empty(), "{query} matched message structure: {hits:?}");
    }

    let hits = resolver.search(&owner("u1"), "attached").await.unwrap();
    assert_eq!(summary(&hits), vec![hit("c4", MatchType::Message)]);
}

#[tokio::test]
async fn test_sqlite_and_in_memory_engines_agree() {
    let (conversations, messages, documents) = common::fixture_rows();
    let extra_conversation = conversation("p1", "u1", "Planning session", day(10));
    let extra_message = message("m9", "p1", "we planned the offsite".into());

    let (_tmp, sqlite) = seeded_store().await;
    sqlite.upsert_conversation(&extra_conversation).await.unwrap();
    sqlite.upsert_message(&extra_message).await.unwrap();

    let memory = InMemoryStore::new();
    for c in conversations {
        memory.insert_conversation(c).unwrap();
    }
    for m in &messages {
        memory.insert_message(m).unwrap();
    }
    for d in documents {
        memory.insert_document(d).unwrap();
    }
    memory.insert_conversation(extra_conversation).unwrap();
    memory.insert_message(&extra_message).unwrap();

    let sqlite = HybridSearchResolver::new(sqlite);
    let memory = HybridSearchResolver::new(memory);

    let queries = [
        "budget",
        "BUDGETS",
        "budget review",
        "notes budget",
        "expense",
        "Expenses report",
        "travel",
        "meals",
        "plan",
        "planning",
        "booking flights",
        "reviewed",
        "attached",
        "document",
        "",
    ];
    for user in ["u1", "u2"] {
        for query in queries {
            let from_sqlite = sqlite.search(&owner(user), query).await.unwrap();
            let from_memory = memory.search(&owner(user), query).await.unwrap();
            assert_eq!(
                summary(&from_sqlite),
                summary(&from_memory),
                "engines disagree for {user} / {query:?}"
            );
        }
    }

    let plan = sqlite.search(&owner("u1"), "plan").await.unwrap();
    assert_eq!(
        summary(&plan),
        vec![hit("p1", MatchType::Both), hit("c3", MatchType::Message)]
    );
}
