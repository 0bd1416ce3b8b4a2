pub mod auth;
pub mod contact;
pub mod extra;
pub mod ids;
pub mod image;
pub mod label;

pub use auth::AuthStatus;
pub use contact::{contact_object, ContactRecord, RawContact};
pub use extra::ExtraFields;
pub use ids::ContactId;
pub use image::ImageData;
pub use label::{decode_label, decode_labeled_array, LabeledValue, RawLabeledValue};
