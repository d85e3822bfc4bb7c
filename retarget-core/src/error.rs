use thiserror::Error;

/// Failures raised while mutating skeletons.
///
/// Every variant is fatal for the stage that raised it: nothing is rolled back and the
/// skeletons involved may be left partially transformed.
#[derive(Debug, Error)]
pub enum RigError {
    #[error("bone '{bone}' not found in skeleton '{skeleton}'")]
    MissingBone { skeleton: String, bone: String },
    #[error("constraint '{constraint}' not found on bone '{bone}'")]
    MissingConstraint { bone: String, constraint: String },
    #[error("bone '{bone}' already exists in skeleton '{skeleton}'")]
    DuplicateBone { skeleton: String, bone: String },
    #[error("bone '{bone}' refers to parent '{parent}' missing from skeleton '{skeleton}'")]
    DanglingParent { skeleton: String, bone: String, parent: String },
    #[error("bone '{bone}' is its own ancestor in skeleton '{skeleton}'")]
    ParentCycle { skeleton: String, bone: String },
    #[error("degenerate geometry at bone '{bone}': {reason}")]
    Degenerate { bone: String, reason: &'static str },
    #[error("{service} failed: {message}")]
    Service { service: &'static str, message: String },
}

impl RigError {
    pub fn missing_bone(skeleton: &str, bone: &str) -> Self {
        RigError::MissingBone { skeleton: skeleton.to_string(), bone: bone.to_string() }
    }

    pub fn service(service: &'static str, message: impl Into<String>) -> Self {
        RigError::Service { service, message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, RigError>;
