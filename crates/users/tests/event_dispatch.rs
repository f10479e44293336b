//! Post-commit event dispatch: user events flow to bus subscribers.

use chrono::Utc;
use uuid::Uuid;

use devplan_core::{AggregateId, AggregateRoot, UserId};
use devplan_events::{execute, Event, EventBus, EventEnvelope, InMemoryEventBus};
use devplan_users::{Email, RegisterUser, User, UserCommand, Username, VerifyEmail};

#[test]
fn committed_user_events_reach_subscribers() {
    let bus: InMemoryEventBus<EventEnvelope<devplan_users::UserEvent>> = InMemoryEventBus::new();
    let notifications = bus.subscribe();

    let user_id = UserId::new();
    let mut user = User::empty(user_id);

    let mut committed = Vec::new();
    committed.extend(
        execute(
            &mut user,
            &UserCommand::Register(RegisterUser {
                user_id,
                username: Username::new("alice").unwrap(),
                email: Email::new("alice@example.com").unwrap(),
                password_hash: "$argon2id$stub".to_string(),
                occurred_at: Utc::now(),
            }),
        )
        .unwrap(),
    );
    committed.extend(
        execute(
            &mut user,
            &UserCommand::VerifyEmail(VerifyEmail {
                user_id,
                auto_approve: true,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap(),
    );

    // Store-then-publish: every committed event gets an envelope with its
    // position in the aggregate stream.
    for (offset, event) in committed.iter().enumerate() {
        let envelope = EventEnvelope::new(
            Uuid::now_v7(),
            AggregateId::from_uuid(user_id.into()),
            "users.user",
            offset as u64 + 1,
            event.clone(),
        );
        bus.publish(envelope).unwrap();
    }

    let first = notifications.try_recv().unwrap();
    assert_eq!(first.sequence_number(), 1);
    assert_eq!(first.payload().event_type(), "users.user.registered");

    let second = notifications.try_recv().unwrap();
    assert_eq!(second.sequence_number(), 2);
    assert_eq!(second.payload().event_type(), "users.user.email_verified");

    assert!(notifications.try_recv().is_err());
    assert_eq!(user.version(), 2);
}
