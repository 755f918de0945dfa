//! hospital-core: Shared domain types for the hospital booking API
//!
//! Entities, write payloads with their validation rules, the list query
//! language and the JSON envelopes used by every endpoint. No I/O lives here.

pub mod appointment;
pub mod hospital;
pub mod pagination;
pub mod query;
pub mod response;
pub mod user;
pub mod validation;

pub use appointment::{Appointment, AppointmentDetail, AppointmentPayload, HospitalSummary};
pub use hospital::{HOSPITAL_FIELDS, Hospital, HospitalFields, HospitalPayload, VacCenter};
pub use pagination::{PageRef, PageRequest, Pagination};
pub use query::{CompareOp, Condition, FieldKind, FieldSpec, ListQuery, Scalar, SortKey};
pub use response::{ApiResponse, Empty, ErrorBody, TokenResponse};
pub use user::{LoginPayload, NewUser, RegisterPayload, Role, User};
pub use validation::{FieldIssue, Validate, ValidationError};
