// Copyright (c) 2025 - Cowboy AI, Inc.
//! Operation Engine
//!
//! Management operations against the resource tree:
//!
//! | Operation            | Mutates | Notes                                         |
//! |----------------------|---------|-----------------------------------------------|
//! | `add`                | yes     | parent must exist, target must not            |
//! | `remove`             | yes     | `recursive=true` for resources with children  |
//! | `write-attribute`    | yes     | constraint check on the prospective set       |
//! | `undefine-attribute` | yes     | same checks as a write of `undefined`         |
//! | `read-attribute`     | no      | defaults and expression resolution on request |
//! | `read-resource`      | no      | `recursive`, `include-defaults`               |
//! | `composite`          | maybe   | ordered steps, all or nothing                 |

pub mod engine;
pub mod handlers;
pub mod lifecycle;
pub mod outcome;
pub mod request;
pub mod view;

pub use engine::{OperationEngine, DEFAULT_MAX_COMPOSITE_STEPS};
pub use handlers::{apply_change, render_resource, ModelChange};
pub use lifecycle::{OperationStage, StageInput, StateMachine, TransitionError};
pub use outcome::{OperationOutcome, Outcome};
pub use request::{Operation, OperationHeaders, OperationKind};
pub use view::{CurrentView, ReadView};
