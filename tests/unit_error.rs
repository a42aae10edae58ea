use taskboard::error::{exit_codes, Error};

#[test]
fn exit_codes_group_by_severity() {
    assert_eq!(
        Error::Validation("bad".to_string()).exit_code(),
        exit_codes::USER_ERROR
    );
    assert_eq!(
        Error::TaskNotFound("t1".to_string()).exit_code(),
        exit_codes::USER_ERROR
    );
    assert_eq!(
        Error::UnknownStatus {
            status: "review".to_string()
        }
        .exit_code(),
        exit_codes::USER_ERROR
    );
    assert_eq!(
        Error::NotCommentAuthor {
            comment_id: "c1".to_string(),
            author: "Grace".to_string()
        }
        .exit_code(),
        exit_codes::FORBIDDEN
    );
    assert_eq!(
        Error::Persistence("rejected".to_string()).exit_code(),
        exit_codes::OPERATION_FAILED
    );
}

#[test]
fn persistence_failures_are_recoverable() {
    // The store is reverted to the snapshot, so re-issuing the gesture is safe.
    assert!(Error::Persistence("rejected".to_string()).is_recoverable());
    assert!(!Error::InvalidConfig("broken".to_string()).is_recoverable());
}

#[test]
fn messages_name_the_entity() {
    let err = Error::NotCommentAuthor {
        comment_id: "c1".to_string(),
        author: "Grace Hopper".to_string(),
    };
    assert!(err.to_string().contains("c1"));
    assert!(err.to_string().contains("Grace Hopper"));
}
