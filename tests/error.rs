use std::path::PathBuf;

use mytasks::error::{exit_codes, Error, JsonError};
use serde_json::Value;

#[test]
fn exit_code_user_error() {
    assert_eq!(
        Error::InvalidArgument("bad input".to_string()).exit_code(),
        exit_codes::USER_ERROR
    );
    assert_eq!(Error::IdentityMissing.exit_code(), exit_codes::USER_ERROR);
    assert_eq!(
        Error::TaskNotFound("t1".to_string()).exit_code(),
        exit_codes::USER_ERROR
    );
}

#[test]
fn exit_code_operation_failed() {
    assert_eq!(
        Error::OperationFailed("boom".to_string()).exit_code(),
        exit_codes::OPERATION_FAILED
    );
    assert_eq!(
        Error::LockFailed(PathBuf::from("tasks.json.lock")).exit_code(),
        exit_codes::OPERATION_FAILED
    );
}

#[test]
fn details_include_document_fields() {
    let err = Error::InvalidDocument {
        path: PathBuf::from("store/tasks.json"),
        reason: "expected value".to_string(),
    };
    let details = err.details().expect("details");
    assert_eq!(details["path"], Value::String("store/tasks.json".to_string()));
    assert_eq!(details["reason"], Value::String("expected value".to_string()));
}

#[test]
fn json_error_includes_details() {
    let err = Error::InvalidConfig("bad config".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    let details = json.details.expect("details");
    assert_eq!(details["message"], Value::String("bad config".to_string()));
}
