// Lead data model and preprocessing
//
// RawCandidate is what search backends return; Lead is the normalized,
// deduplicated record the rest of the pipeline operates on.

mod extract;
mod preprocess;
pub mod store;
mod types;

pub use extract::{
    extract_emails, extract_phone_numbers, extract_social_handles, platform_handle_from_url,
};
pub use preprocess::preprocess;
pub use types::{Lead, RawCandidate};
