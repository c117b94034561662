pub mod debounce;
pub mod pad;
pub mod view;

pub use debounce::{Debouncer, Ticket};
pub use pad::{Handled, SignaturePad};
pub use view::{Indicator, RegistrationPage, SignatureField, SubmitBlocked};
