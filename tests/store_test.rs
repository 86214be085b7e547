//! Store-level invariants: guarded transitions, uniqueness rules,
//! participant bookkeeping

mod common;

use chrono::Utc;

use challenge_matrix::domain::{ChallengeStatus, Office, RewardDraft, RewardType};
use challenge_matrix::store::{Advancement, Store, StoreError};

use common::{create_active_challenge, create_user, challenge_draft, open_store};

#[tokio::test]
async fn test_only_one_active_challenge_per_level() {
    let store = open_store();
    let _first = create_active_challenge(&store, 1).await;

    let second = store
        .create_challenge(&challenge_draft(1), Utc::now())
        .await
        .unwrap();
    let err = store
        .update_challenge_status(
            &second.id,
            ChallengeStatus::Draft,
            ChallengeStatus::Active,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict));

    // A second level is unaffected
    create_active_challenge(&store, 2).await;
}

#[tokio::test]
async fn test_status_transition_is_guarded() {
    let store = open_store();
    let challenge = create_active_challenge(&store, 1).await;

    store
        .update_challenge_status(
            &challenge.id,
            ChallengeStatus::Active,
            ChallengeStatus::Completed,
            Utc::now(),
        )
        .await
        .unwrap();

    // The challenge is no longer active; the same transition conflicts
    let err = store
        .update_challenge_status(
            &challenge.id,
            ChallengeStatus::Active,
            ChallengeStatus::Completed,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict));
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let store = open_store();
    create_user(&store, "Ada", Office::Annani).await;

    let err = store
        .create_user(
            challenge_matrix::store::NewUser {
                full_name: "Ada Again".to_string(),
                email: "ada@example.com".to_string(),
                longrich_code: "LR999999".to_string(),
                office: Office::Attingier,
                role: challenge_matrix::domain::Role::User,
            },
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict));
}

#[tokio::test]
async fn test_ensure_participant_is_idempotent() {
    let store = open_store();
    let user = create_user(&store, "Ada", Office::Annani).await;
    let challenge = create_active_challenge(&store, 1).await;

    let first = store
        .ensure_participant(&user.id, &challenge.id, Utc::now())
        .await
        .unwrap();
    let second = store
        .ensure_participant(&user.id, &challenge.id, Utc::now())
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.current_points, 0);
}

#[tokio::test]
async fn test_replace_rewards_orders_by_threshold() {
    let store = open_store();
    let challenge = create_active_challenge(&store, 1).await;

    let drafts = vec![
        RewardDraft {
            title: "Trip".to_string(),
            description: String::new(),
            image_url: None,
            kind: RewardType::Bonus,
            min_points: 300,
        },
        RewardDraft {
            title: "Badge".to_string(),
            description: String::new(),
            image_url: None,
            kind: RewardType::Badge,
            min_points: 50,
        },
    ];
    store
        .replace_rewards(&challenge.id, &drafts, Utc::now())
        .await
        .unwrap();

    let rewards = store.list_rewards(&challenge.id).await.unwrap();
    assert_eq!(rewards.len(), 2);
    assert_eq!(rewards[0].title, "Badge");
    assert_eq!(rewards[1].title, "Trip");

    // Replacing again swaps the whole list
    store
        .replace_rewards(&challenge.id, &drafts[..1], Utc::now())
        .await
        .unwrap();
    let rewards = store.list_rewards(&challenge.id).await.unwrap();
    assert_eq!(rewards.len(), 1);
    assert_eq!(rewards[0].title, "Trip");
}

#[tokio::test]
async fn test_update_challenge_edits_draft_fields() {
    let store = open_store();
    let challenge = store
        .create_challenge(&challenge_draft(1), Utc::now())
        .await
        .unwrap();

    let mut draft = challenge_draft(1);
    draft.title = "Level 1 (revised)".to_string();
    draft.min_points = 250;
    store
        .update_challenge(&challenge.id, &draft, Utc::now())
        .await
        .unwrap();

    let reloaded = store.get_challenge(&challenge.id).await.unwrap();
    assert_eq!(reloaded.title, "Level 1 (revised)");
    assert_eq!(reloaded.min_points, 250);
    // Editing does not touch the status
    assert_eq!(reloaded.status, ChallengeStatus::Draft);

    let err = store
        .update_challenge("missing", &draft, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
}

#[tokio::test]
async fn test_update_user_level_repair_path() {
    let store = open_store();
    let user = create_user(&store, "Ada", Office::Annani).await;

    store
        .update_user_level(&user.id, 3, Utc::now())
        .await
        .unwrap();

    let user = store.get_user(&user.id).await.unwrap();
    assert_eq!(user.current_level, 3);
    assert!(user.terms_accepted);
    assert!(user.terms_accepted_at.is_some());
}

#[tokio::test]
async fn test_advance_user_is_atomic_and_guarded() {
    let store = open_store();
    let user = create_user(&store, "Ada", Office::Annani).await;
    let challenge = create_active_challenge(&store, 1).await;
    create_active_challenge(&store, 2).await;

    let advancement = Advancement {
        user_id: user.id.clone(),
        challenge_id: challenge.id.clone(),
        next_level: 2,
        accepted_at: Utc::now(),
    };
    store.advance_user(&advancement).await.unwrap();

    let user = store.get_user(&user.id).await.unwrap();
    assert_eq!(user.current_level, 2);
    assert!(user.terms_accepted);
    assert_eq!(
        store.get_challenge(&challenge.id).await.unwrap().status,
        ChallengeStatus::Completed
    );

    // The challenge is already completed: the retry conflicts and the
    // user's level stays where it is
    let err = store.advance_user(&advancement).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict));
    assert_eq!(store.get_user(&user.id).await.unwrap().current_level, 2);
}

#[tokio::test]
async fn test_advance_user_rejects_stale_level() {
    let store = open_store();
    let user = create_user(&store, "Ada", Office::Annani).await;
    let challenge = create_active_challenge(&store, 1).await;

    // Claims the user is on level 4 while the row still says 1: the user
    // guard matches nothing and the challenge update rolls back with it
    let err = store
        .advance_user(&Advancement {
            user_id: user.id.clone(),
            challenge_id: challenge.id.clone(),
            next_level: 5,
            accepted_at: Utc::now(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict));

    assert_eq!(store.get_user(&user.id).await.unwrap().current_level, 1);
    assert_eq!(
        store.get_challenge(&challenge.id).await.unwrap().status,
        ChallengeStatus::Active
    );
}
