//! Search request intake: raw form fields, validation and trip windows.

mod model;
mod validation;
mod window;

pub use model::{RawSearchRequest, SearchRequest, SeatClass};
pub use validation::{DATE_FORMAT, ValidationError, validate};
pub(crate) use validation::is_valid_email;
pub use window::TripWindow;
