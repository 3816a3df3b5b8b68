//! Domain layer: strong types with validation and invariants (no I/O).

mod inbound;
mod request;
mod response;
mod validation;
mod value;

pub use inbound::{
    Group, GroupInfo, ReceivedMessage, TIME_FORMAT, format_timestamp, sender_number,
};
pub use request::{CodeRequestMethod, Location, Message, MessageKind, Recipients};
pub use response::{FailureRecord, PayloadShape, Response, STATUS_FAIL};
pub use validation::ValidationError;
pub use value::{GroupId, MessageId, Nickname, Password, PhoneNumber, RegistrationCode};
