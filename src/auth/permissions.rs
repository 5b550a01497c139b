//! Operations exposed by the service facade and their access policy
//!
//! Every facade call is checked against an `AccessPolicy` before it
//! touches the engine. `AllowAll` is the default; stricter policies slot in
//! without changes to the engine.

use std::fmt;

use crate::auth::ActorToken;

/// Operation names for every facade entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListChains,
    GetChain,
    ListExercises,
    GetExercise,
    ListWorkshops,
    GetWorkshop,
    CreateWorkshop,
    UpdateWorkshop,
    StartWorkshop,
    AdvanceWorkshop,
    AddObservation,
}

impl Operation {
    /// Whether the operation writes to the store
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Operation::CreateWorkshop
                | Operation::UpdateWorkshop
                | Operation::StartWorkshop
                | Operation::AdvanceWorkshop
                | Operation::AddObservation
        )
    }

    /// Human-readable description for logging
    pub fn description(&self) -> &'static str {
        match self {
            Operation::ListChains => "List chains",
            Operation::GetChain => "Get chain",
            Operation::ListExercises => "List active exercises",
            Operation::GetExercise => "Get exercise",
            Operation::ListWorkshops => "List workshops",
            Operation::GetWorkshop => "Get workshop",
            Operation::CreateWorkshop => "Create workshop",
            Operation::UpdateWorkshop => "Update workshop",
            Operation::StartWorkshop => "Start workshop",
            Operation::AdvanceWorkshop => "Advance workshop",
            Operation::AddObservation => "Add observation",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Outcome of an access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(String),
}

/// Authorization capability consulted before every operation
pub trait AccessPolicy: Send + Sync {
    fn check(&self, actor: &ActorToken, operation: Operation) -> AccessDecision;
}

/// Permits everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn check(&self, _actor: &ActorToken, _operation: Operation) -> AccessDecision {
        AccessDecision::Allow
    }
}

/// Reads are open; mutations need a presented token
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireActor;

impl AccessPolicy for RequireActor {
    fn check(&self, actor: &ActorToken, operation: Operation) -> AccessDecision {
        if operation.is_mutation() && actor.is_anonymous() {
            AccessDecision::Deny(format!("{} requires an access token", operation))
        } else {
            AccessDecision::Allow
        }
    }
}
